use logshare_analysis::TrafficReport;
use tera::{Context, Tera};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug)]
pub struct RenderError(pub String);

impl From<tera::Error> for RenderError {
    fn from(e: tera::Error) -> Self { RenderError(e.to_string()) }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self { RenderError(e.to_string()) }
}

/// Labels and values for one Chart.js bar chart, already JSON encoded.
struct ChartData {
    labels_json: String,
    counts_json: String,
}

fn chart(rows: &[(&str, u64)]) -> Result<ChartData, RenderError> {
    let labels: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let counts: Vec<u64> = rows.iter().map(|r| r.1).collect();
    Ok(ChartData {
        labels_json: serde_json::to_string(&labels)?,
        counts_json: serde_json::to_string(&counts)?,
    })
}

/// Full dashboard page for one analyzed log
pub fn report_page(tera: &Tera, source: &str, report: &TrafficReport) -> Result<String, RenderError> {
    let ips = chart(&report.ips_by_count())?;
    let hours = chart(&report.hours_by_key())?;

    let mut ctx = Context::new();
    ctx.insert("source", source);
    ctx.insert("report", report);
    ctx.insert("total", &report.total_requests());
    ctx.insert("is_empty", &report.is_empty());
    ctx.insert("ip_labels_json", &ips.labels_json);
    ctx.insert("ip_counts_json", &ips.counts_json);
    ctx.insert("hour_labels_json", &hours.labels_json);
    ctx.insert("hour_counts_json", &hours.counts_json);
    ctx.insert("generated_at", &now_rfc3339());
    Ok(tera.render("dashboard.html", &ctx)?)
}

pub fn upload_page(tera: &Tera) -> Result<String, RenderError> {
    let ctx = Context::new();
    Ok(tera.render("upload.html", &ctx)?)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "now".to_string())
}
