use actix_web::{HttpResponse, Responder, get, web};
use log::error;

use crate::AppState;
use crate::routes::{ShareQuery, analyze_bytes, render_report};

/// Dashboard over the log file the server was started with.
#[get("/")]
pub async fn dashboard(data: web::Data<AppState>, query: web::Query<ShareQuery>) -> impl Responder {
    let shares = match query.resolve() {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    let path = data.log_file.clone();
    let bytes = match web::block(move || std::fs::read(path)).await {
        Ok(Ok(b)) => b,
        Ok(Err(e)) => {
            error!("read {}: {e}", data.log_file.display());
            return HttpResponse::InternalServerError()
                .body(format!("cannot read {}: {e}", data.log_file.display()));
        }
        Err(e) => return HttpResponse::InternalServerError().body(format!("worker error: {e}")),
    };

    let source = data.log_file.display().to_string();
    let report = analyze_bytes(&source, &bytes, shares);
    render_report(&data, &source, &report)
}
