use actix_web::{HttpResponse, Responder, post, web};
use futures_util::StreamExt as _;
use log::{error, info};
use url::Url;

use crate::AppState;
use crate::routes::{ShareQuery, analyze_bytes, render_report};

#[derive(serde::Deserialize)]
pub struct FetchForm {
    pub url: String,
}

pub enum FetchError {
    BadUrl(String),
    Upstream(String),
    TooLarge(usize),
}

impl FetchError {
    fn into_response(self) -> HttpResponse {
        match self {
            FetchError::BadUrl(m) => HttpResponse::BadRequest().body(m),
            FetchError::Upstream(m) => HttpResponse::BadGateway().body(m),
            FetchError::TooLarge(max) => {
                HttpResponse::PayloadTooLarge().body(format!("log larger than {max} bytes"))
            }
        }
    }
}

/// Only plain http(s) URLs are fetched.
pub fn parse_log_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::BadUrl(format!("invalid url: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::BadUrl(format!("unsupported scheme '{other}'"))),
    }
}

async fn download(data: &AppState, url: Url) -> Result<Vec<u8>, FetchError> {
    let resp = data
        .http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::Upstream(format!("fetch {url}: {e}")))?;
    if !resp.status().is_success() {
        return Err(FetchError::Upstream(format!("fetch {url}: status {}", resp.status())));
    }

    let mut body = Vec::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|e| FetchError::Upstream(format!("fetch {url}: {e}")))?;
        if body.len() + bytes.len() > data.max_upload_bytes {
            return Err(FetchError::TooLarge(data.max_upload_bytes));
        }
        body.extend_from_slice(&bytes);
    }
    Ok(body)
}

#[post("/fetch")]
pub async fn fetch_log(
    data: web::Data<AppState>,
    form: web::Form<FetchForm>,
    query: web::Query<ShareQuery>,
) -> impl Responder {
    let shares = match query.resolve() {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    let url = match parse_log_url(&form.url) {
        Ok(u) => u,
        Err(e) => return e.into_response(),
    };

    info!("fetching {url}");
    let bytes = match download(&data, url.clone()).await {
        Ok(b) => b,
        Err(e) => {
            if let FetchError::Upstream(m) = &e {
                error!("{m}");
            }
            return e.into_response();
        }
    };

    let source = url.to_string();
    let report = analyze_bytes(&source, &bytes, shares);
    render_report(&data, &source, &report)
}
