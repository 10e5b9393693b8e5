use actix_web::{App, HttpServer, middleware::Logger, web};
use log::info;
use std::{env, fs, path::PathBuf, time::Duration};
use tera::Tera;

mod routes;
mod template;
mod templates;

use routes::{api, dashboard, fetch, upload};

#[derive(Clone)]
pub struct AppState {
    pub log_file: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub http: reqwest::Client,
    pub tera: Tera,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn absolute(p: PathBuf) -> std::io::Result<PathBuf> {
    if p.is_absolute() { Ok(p) } else { Ok(env::current_dir()?.join(p)) }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard::dashboard)
        .service(upload::upload_page)
        .service(upload::upload_log)
        .service(fetch::fetch_log)
        .service(api::get_report)
        .service(api::upload_logs);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env_or("APP_PORT", 8080);
    let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "apache_combined.log.txt".to_string());
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
    let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", 16 * 1024 * 1024);
    let fetch_timeout = Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 10));

    let upload_dir = absolute(PathBuf::from(upload_dir))?;
    fs::create_dir_all(&upload_dir)?;

    let tera = templates::build().map_err(std::io::Error::other)?;
    let http = reqwest::Client::builder()
        .timeout(fetch_timeout)
        .build()
        .map_err(std::io::Error::other)?;

    let data = web::Data::new(AppState {
        log_file: absolute(PathBuf::from(log_file))?,
        upload_dir,
        max_upload_bytes,
        http,
        tera,
    });

    info!(
        "serving {} on http://{host}:{port} (uploads in {})",
        data.log_file.display(),
        data.upload_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
