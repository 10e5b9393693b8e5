//! Access-log traffic analysis.
//!
//! Turns Apache/NGINX "combined" access-log lines into per-IP and per-hour
//! request counts, then picks the smallest set of IPs (or hours) that carries
//! a given share of all traffic. Nothing in here touches the filesystem or the
//! network; callers hand in text and get a [`TrafficReport`] back.

mod error;
mod extract;
mod report;
mod select;
mod share;
mod table;

pub use error::{Error, Result};
pub use extract::{extract, LogRecord};
pub use report::{analyze_lines, analyze_text, split_lines, TrafficReport};
pub use select::select;
pub use share::Share;
pub use table::{aggregate, Aggregator, FrequencyTable};
