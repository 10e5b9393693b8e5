use serde::Serialize;

use crate::select::select;
use crate::share::Share;
use crate::table::{Aggregator, FrequencyTable};

/// Everything the CLI and the dashboards show for one log.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TrafficReport {
    pub ip_counts: FrequencyTable,
    pub hour_counts: FrequencyTable,
    pub top_ips: Vec<String>,
    pub peak_hours: Vec<String>,
    pub ip_share: Share,
    pub hour_share: Share,
    pub lines_read: u64,
    pub lines_skipped: u64,
}

impl TrafficReport {
    pub fn from_aggregator(agg: Aggregator, ip_share: Share, hour_share: Share) -> Self {
        let (ip_counts, hour_counts, lines_read, lines_skipped) = agg.finish();
        let top_ips = select(&ip_counts, ip_share);
        let peak_hours = select(&hour_counts, hour_share);
        TrafficReport {
            ip_counts,
            hour_counts,
            top_ips,
            peak_hours,
            ip_share,
            hour_share,
            lines_read,
            lines_skipped,
        }
    }

    /// Requests that made it into the tables.
    pub fn total_requests(&self) -> u64 {
        self.ip_counts.total()
    }

    pub fn is_empty(&self) -> bool {
        self.ip_counts.is_empty()
    }

    /// IP histogram rows, most requests first.
    pub fn ips_by_count(&self) -> Vec<(&str, u64)> {
        self.ip_counts.ranked()
    }

    /// Hourly histogram rows, in hour order.
    pub fn hours_by_key(&self) -> Vec<(&str, u64)> {
        self.hour_counts.iter().collect()
    }
}

pub fn analyze_lines<I, S>(lines: I, ip_share: Share, hour_share: Share) -> TrafficReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut agg = Aggregator::new();
    for line in lines {
        agg.feed_line(line.as_ref());
    }
    TrafficReport::from_aggregator(agg, ip_share, hour_share)
}

pub fn analyze_text(text: &str, ip_share: Share, hour_share: Share) -> TrafficReport {
    analyze_lines(split_lines(text), ip_share, hour_share)
}

/// Split on `\n`, `\r\n` and bare `\r`; a trailing terminator does not start
/// another line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let pieces = if text.is_empty() { None } else { Some(body.split('\n')) };
    pieces
        .into_iter()
        .flatten()
        .flat_map(|piece| piece.strip_suffix('\r').unwrap_or(piece).split('\r'))
}
