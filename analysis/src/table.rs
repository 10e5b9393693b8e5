use std::collections::BTreeMap;

use serde::Serialize;

use crate::extract::{extract, LogRecord};

/// Request counts keyed by IP or by hour.
///
/// Iteration is by ascending key, so two tables built from the same input
/// always walk in the same order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, n: u64) {
        if let Some(c) = self.counts.get_mut(key) {
            *c += n;
        } else {
            self.counts.insert(key.to_string(), n);
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Fold another table's counts into this one.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (key, n) in other.iter() {
            self.add(key, n);
        }
    }

    /// Pairs ordered by count descending, ties by ascending key.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut v: Vec<(&str, u64)> = self.iter().collect();
        // stable: equal counts keep the ascending key order of the map
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    }
}

impl<K: AsRef<str>> FromIterator<(K, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (key, n) in iter {
            table.add(key.as_ref(), n);
        }
        table
    }
}

/// Build the IP table and the hour table from a sequence of records.
pub fn aggregate<I>(records: I) -> (FrequencyTable, FrequencyTable)
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut agg = Aggregator::new();
    for rec in records {
        agg.push(&rec);
    }
    (agg.ips, agg.hours)
}

/// Line-at-a-time fold over a log.
///
/// Keeps running counts of lines seen and lines that did not yield a record,
/// so a caller can tell when the log is in a format the extractor does not
/// understand.
#[derive(Debug, Default)]
pub struct Aggregator {
    ips: FrequencyTable,
    hours: FrequencyTable,
    lines_read: u64,
    lines_skipped: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rec: &LogRecord) {
        self.ips.increment(&rec.ip);
        self.hours.increment(&rec.hour);
    }

    pub fn feed_line(&mut self, line: &str) {
        self.lines_read += 1;
        match extract(line) {
            Some(rec) => self.push(&rec),
            None => self.lines_skipped += 1,
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// `(ips, hours, lines_read, lines_skipped)`
    pub fn finish(self) -> (FrequencyTable, FrequencyTable, u64, u64) {
        (self.ips, self.hours, self.lines_read, self.lines_skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ip: &str, hour: &str) -> LogRecord {
        LogRecord { ip: ip.into(), hour: hour.into() }
    }

    #[test]
    fn aggregate_counts_each_axis_independently() {
        let (ips, hours) = aggregate(vec![
            rec("10.0.0.1", "13"),
            rec("10.0.0.1", "14"),
            rec("10.0.0.2", "13"),
        ]);
        assert_eq!(ips.get("10.0.0.1"), 2);
        assert_eq!(ips.get("10.0.0.2"), 1);
        assert_eq!(hours.get("13"), 2);
        assert_eq!(hours.get("14"), 1);
        assert_eq!(ips.total(), 3);
        assert_eq!(hours.total(), 3);
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let (ips, hours) = aggregate(Vec::new());
        assert!(ips.is_empty());
        assert!(hours.is_empty());
        assert_eq!(ips.total(), 0);
    }

    #[test]
    fn unknown_key_counts_zero() {
        assert_eq!(FrequencyTable::new().get("1.1.1.1"), 0);
    }

    #[test]
    fn merge_matches_single_pass() {
        let all = vec![rec("a", "01"), rec("b", "01"), rec("a", "02"), rec("c", "03")];
        let (whole, _) = aggregate(all.clone());

        let (mut left, _) = aggregate(all[..2].to_vec());
        let (right, _) = aggregate(all[2..].to_vec());
        left.merge(&right);

        assert_eq!(left, whole);
    }

    #[test]
    fn ranked_breaks_ties_by_key() {
        let table: FrequencyTable = [("c", 5), ("a", 5), ("b", 9), ("d", 1)].into_iter().collect();
        let keys: Vec<&str> = table.ranked().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn feed_line_counts_skipped_lines() {
        let mut agg = Aggregator::new();
        agg.feed_line("10.0.0.1 - - [10/Oct/2023:13:55:36 -0700] \"GET /\"");
        agg.feed_line("garbage");
        agg.feed_line("");
        assert_eq!((agg.lines_read(), agg.lines_skipped()), (3, 2));
        let (ips, hours, read, skipped) = agg.finish();
        assert_eq!(read, 3);
        assert_eq!(skipped, 2);
        assert_eq!(ips.total(), 1);
        assert_eq!(hours.get("13"), 1);
    }

    #[test]
    fn serializes_as_plain_map() {
        let table: FrequencyTable = [("14", 1), ("13", 2)].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"13":2,"14":1}"#);
    }
}
