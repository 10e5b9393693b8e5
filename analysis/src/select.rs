use crate::share::Share;
use crate::table::FrequencyTable;

/// Smallest set of keys, heaviest first, whose counts add up to at least
/// `share` of the table's total.
///
/// Keys with equal counts are taken in ascending key order. The key whose
/// count crosses the threshold is included. An empty table selects nothing.
pub fn select(table: &FrequencyTable, share: Share) -> Vec<String> {
    let total = table.total();
    if total == 0 {
        return Vec::new();
    }

    let mut running: u64 = 0;
    let mut picked = Vec::new();
    for (key, count) in table.ranked() {
        running += count;
        picked.push(key.to_string());
        if share.is_reached(running, total) {
            break;
        }
    }
    picked
}
