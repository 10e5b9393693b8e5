use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, Responder, error, get, post, web};
use futures_util::StreamExt as _;
use log::info;
use sha2::{Digest, Sha256};
use std::fs;

use crate::AppState;
use crate::routes::{ShareQuery, analyze_bytes, render_report};
use crate::template;

/// Form field carrying the log in multipart uploads.
pub const LOG_FIELD: &str = "log_file";

pub struct SavedLog {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Buffer the `log_file` field (up to `max_bytes`) and keep a copy in the
/// upload directory, named by content hash so re-uploads overwrite.
///
/// Returns `Ok(None)` when the form carries no such field or it is empty.
pub async fn save_log_field(
    data: &AppState,
    mut payload: Multipart,
) -> Result<Option<SavedLog>, Error> {
    let mut found: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let cd = field.content_disposition().clone();
        let name = cd.get_name().unwrap_or("");
        if name != LOG_FIELD || found.is_some() {
            while let Some(chunk) = field.next().await { let _ = chunk?; }
            continue;
        }

        let original = cd.get_filename().unwrap_or("upload.log").to_string();
        let mut buf = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk?;
            if buf.len() + bytes.len() > data.max_upload_bytes {
                return Err(error::ErrorPayloadTooLarge(format!(
                    "log larger than {} bytes",
                    data.max_upload_bytes
                )));
            }
            buf.extend_from_slice(&bytes);
        }
        found = Some((original, buf));
    }

    let Some((original, bytes)) = found else { return Ok(None) };
    if bytes.is_empty() {
        return Ok(None);
    }

    let sum_hex = hex::encode(Sha256::digest(&bytes));
    let dest = data.upload_dir.join(format!("{sum_hex}.log"));
    let path = dest.clone();
    let bytes = web::block(move || fs::write(&path, &bytes).map(|()| bytes)).await??;
    info!("saved upload {original} ({} bytes) as {}", bytes.len(), dest.display());

    Ok(Some(SavedLog { name: original, bytes }))
}

#[get("/upload")]
pub async fn upload_page(data: web::Data<AppState>) -> impl Responder {
    match template::upload_page(&data.tera) {
        Ok(html) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html),
        Err(e) => HttpResponse::InternalServerError().body(e.0),
    }
}

#[post("/upload")]
pub async fn upload_log(
    data: web::Data<AppState>,
    payload: Multipart,
    query: web::Query<ShareQuery>,
) -> Result<HttpResponse, Error> {
    let shares = query.resolve().map_err(error::ErrorBadRequest)?;

    let Some(saved) = save_log_field(&data, payload).await? else {
        return Ok(HttpResponse::BadRequest().body(format!("missing or empty '{LOG_FIELD}' field")));
    };

    let report = analyze_bytes(&saved.name, &saved.bytes, shares);
    Ok(render_report(&data, &saved.name, &report))
}
