pub mod api;
pub mod dashboard;
pub mod fetch;
pub mod upload;

use actix_web::HttpResponse;
use log::warn;
use logshare_analysis::{Share, TrafficReport, analyze_text};

use crate::{AppState, template};

/// Optional `?ip_share=..&hour_share=..` overrides, in `Share` text form.
#[derive(serde::Deserialize, Default)]
pub struct ShareQuery {
    pub ip_share: Option<String>,
    pub hour_share: Option<String>,
}

impl ShareQuery {
    pub fn resolve(&self) -> Result<(Share, Share), logshare_analysis::Error> {
        let ip = match &self.ip_share {
            Some(s) => s.parse()?,
            None => Share::IP_DEFAULT,
        };
        let hour = match &self.hour_share {
            Some(s) => s.parse()?,
            None => Share::HOUR_DEFAULT,
        };
        Ok((ip, hour))
    }
}

/// Decode lossily and run the analysis, noting lines that were not parsed.
pub fn analyze_bytes(source: &str, bytes: &[u8], (ip, hour): (Share, Share)) -> TrafficReport {
    let text = String::from_utf8_lossy(bytes);
    let report = analyze_text(&text, ip, hour);
    if report.lines_skipped > 0 {
        warn!(
            "{source}: skipped {} of {} lines that did not look like access-log entries",
            report.lines_skipped, report.lines_read
        );
    }
    report
}

pub fn render_report(data: &AppState, source: &str, report: &TrafficReport) -> HttpResponse {
    match template::report_page(&data.tera, source, report) {
        Ok(html) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html),
        Err(e) => HttpResponse::InternalServerError().body(format!("render error: {}", e.0)),
    }
}
