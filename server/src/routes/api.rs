use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, error, get, post, web};
use log::error;

use crate::AppState;
use crate::routes::upload::{LOG_FIELD, save_log_field};
use crate::routes::{ShareQuery, analyze_bytes};

/// JSON report of the configured log file.
#[get("/api/v1/report")]
pub async fn get_report(
    data: web::Data<AppState>,
    query: web::Query<ShareQuery>,
) -> Result<HttpResponse, Error> {
    let shares = query.resolve().map_err(error::ErrorBadRequest)?;

    let path = data.log_file.clone();
    let bytes = web::block(move || std::fs::read(path))
        .await?
        .map_err(|e| {
            error!("read {}: {e}", data.log_file.display());
            error::ErrorInternalServerError(format!("cannot read {}: {e}", data.log_file.display()))
        })?;

    let report = analyze_bytes(&data.log_file.display().to_string(), &bytes, shares);
    Ok(HttpResponse::Ok().json(report))
}

/// Multipart upload (`log_file` field), answered with the JSON report.
#[post("/api/v1/logs")]
pub async fn upload_logs(
    data: web::Data<AppState>,
    payload: Multipart,
    query: web::Query<ShareQuery>,
) -> Result<HttpResponse, Error> {
    let shares = query.resolve().map_err(error::ErrorBadRequest)?;

    let Some(saved) = save_log_field(&data, payload).await? else {
        return Err(error::ErrorBadRequest(format!("missing or empty '{LOG_FIELD}' field")));
    };

    let report = analyze_bytes(&saved.name, &saved.bytes, shares);
    Ok(HttpResponse::Ok().json(report))
}
