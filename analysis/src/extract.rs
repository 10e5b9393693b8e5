use regex::Regex;
use serde::Serialize;

lazy_static::lazy_static! {
    // dotted quad, no octet range check
    static ref RE_IP: Regex = Regex::new(
        r"(\d+\.\d+\.\d+\.\d+)"
    ).unwrap();

    // [10/Oct/2023:13:55:36 -> 13
    static ref RE_HOUR: Regex = Regex::new(
        r"\[\d{2}/\w+/\d{4}:(?P<hour>\d{2}):\d{2}:\d{2}"
    ).unwrap();
}

/// One request seen in the log: who sent it and in which hour of the day.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogRecord {
    pub ip: String,
    pub hour: String,
}

/// Pull the first IP-shaped token and the hour of the first bracketed
/// timestamp out of `line`.
///
/// Both patterns are searched independently; the line only yields a record
/// when both are present.
pub fn extract(line: &str) -> Option<LogRecord> {
    let ip = RE_IP.captures(line)?.get(1)?.as_str();
    let hour = RE_HOUR.captures(line)?.name("hour")?.as_str();

    Some(LogRecord {
        ip: ip.to_string(),
        hour: hour.to_string(),
    })
}
