use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

// keeps num * 10^digits inside u64
const MAX_DECIMAL_DIGITS: usize = 18;

/// An exact fraction of total traffic in (0, 1].
///
/// Stored as a reduced ratio so the threshold test in [`crate::select`] is
/// pure integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Share {
    num: u64,
    den: u64,
}

impl Share {
    /// Share of requests the reported IP set must cover.
    pub const IP_DEFAULT: Share = Share { num: 17, den: 20 };
    /// Share of requests the reported hour set must cover.
    pub const HOUR_DEFAULT: Share = Share { num: 7, den: 10 };
    pub const ALL: Share = Share { num: 1, den: 1 };

    pub fn new(num: u64, den: u64) -> Result<Self> {
        if den == 0 {
            return Err(Error::invalid_share(format!("{num}/{den}"), "zero denominator"));
        }
        if num == 0 {
            return Err(Error::invalid_share(format!("{num}/{den}"), "must be greater than zero"));
        }
        if num > den {
            return Err(Error::invalid_share(format!("{num}/{den}"), "must not exceed 100%"));
        }
        let g = gcd(num, den);
        Ok(Share { num: num / g, den: den / g })
    }

    pub fn percent(p: u64) -> Result<Self> {
        Share::new(p, 100)
    }

    /// `part / total >= self`, without rounding.
    pub fn is_reached(&self, part: u64, total: u64) -> bool {
        (part as u128) * (self.den as u128) >= (self.num as u128) * (total as u128)
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hundred = self.num as u128 * 100;
        if hundred % self.den as u128 == 0 {
            write!(f, "{}%", hundred / self.den as u128)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl Serialize for Share {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `85%`, `12.5%`, `0.85`, `1` and `17/20`.
impl FromStr for Share {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        if let Some((n, d)) = raw.split_once('/') {
            let num = n.trim().parse::<u64>().map_err(|_| Error::invalid_share(s, "not a ratio"))?;
            let den = d.trim().parse::<u64>().map_err(|_| Error::invalid_share(s, "not a ratio"))?;
            return Share::new(num, den).map_err(|_| Error::invalid_share(s, "must be in (0, 1]"));
        }

        let (digits, percent) = match raw.strip_suffix('%') {
            Some(rest) => (rest.trim_end(), true),
            None => (raw, false),
        };
        let (num, mut den) =
            parse_decimal(digits).ok_or_else(|| Error::invalid_share(s, "not a number"))?;
        if percent {
            den = den.checked_mul(100).ok_or_else(|| Error::invalid_share(s, "too precise"))?;
        }
        Share::new(num, den).map_err(|_| Error::invalid_share(s, "must be in (0, 1]"))
    }
}

/// `"12.50"` -> `(1250, 100)`
fn parse_decimal(s: &str) -> Option<(u64, u64)> {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if int.len() + frac.len() > MAX_DECIMAL_DIGITS {
        return None;
    }
    if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut num: u64 = 0;
    for b in int.bytes().chain(frac.bytes()) {
        num = num * 10 + u64::from(b - b'0');
    }
    let den = 10u64.pow(frac.len() as u32);
    Some((num, den))
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_85_and_70_percent() {
        assert_eq!(Share::IP_DEFAULT, Share::percent(85).unwrap());
        assert_eq!(Share::HOUR_DEFAULT, Share::percent(70).unwrap());
        assert_eq!(Share::IP_DEFAULT.to_string(), "85%");
        assert_eq!(Share::HOUR_DEFAULT.to_string(), "70%");
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Share::percent(0).is_err());
        assert!(Share::percent(101).is_err());
        assert!(Share::new(1, 0).is_err());
        assert!(Share::new(3, 2).is_err());
        assert!(Share::ALL == Share::percent(100).unwrap());
    }

    #[test]
    fn parses_text_forms_exactly() {
        assert_eq!("85%".parse::<Share>().unwrap(), Share::percent(85).unwrap());
        assert_eq!("0.85".parse::<Share>().unwrap(), Share::percent(85).unwrap());
        assert_eq!(" 70 % ".parse::<Share>().unwrap(), Share::percent(70).unwrap());
        assert_eq!("12.5%".parse::<Share>().unwrap(), Share::new(1, 8).unwrap());
        assert_eq!("1".parse::<Share>().unwrap(), Share::ALL);
        assert_eq!(".5".parse::<Share>().unwrap(), Share::new(1, 2).unwrap());
        assert_eq!("17/20".parse::<Share>().unwrap(), Share::IP_DEFAULT);
    }

    #[test]
    fn rejects_bad_text() {
        for bad in ["", "%", ".", "abc", "-0.5", "1.5", "0", "0%", "150%", "1/0", "2/1", "0.1.2"] {
            let err = bad.parse::<Share>().unwrap_err();
            assert!(matches!(err, Error::InvalidShare { .. }), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn threshold_test_is_exact_at_the_boundary() {
        let s = Share::percent(85).unwrap();
        assert!(s.is_reached(85, 100));
        assert!(!s.is_reached(84, 100));
        // 0.7 * 10 is 7.000000000000001 in f64
        let h = Share::percent(70).unwrap();
        assert!(h.is_reached(7, 10));
        assert!(!h.is_reached(6, 10));
    }

    #[test]
    fn full_total_always_reaches_any_share() {
        for p in 1..=100 {
            let s = Share::percent(p).unwrap();
            assert!(s.is_reached(u64::MAX, u64::MAX));
            assert!(s.is_reached(1, 1));
        }
    }

    #[test]
    fn display_falls_back_to_ratio() {
        assert_eq!(Share::new(1, 3).unwrap().to_string(), "1/3");
        assert_eq!(Share::new(1, 8).unwrap().to_string(), "1/8");
    }
}
