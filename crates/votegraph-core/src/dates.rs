//! Date parsing, proximity checks and calendar year/month differences.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Parse an ISO-ish date: `YYYY-MM-DD`, RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]`. Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Whether two dates lie within `slack_days` calendar days of each other.
///
/// A missing date on either side is never close.
pub fn within_days(a: Option<NaiveDate>, b: Option<NaiveDate>, slack_days: i64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).num_days().abs() <= slack_days,
        _ => false,
    }
}

/// Elapsed whole years and months between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub years: i32,
    /// Always within `0..=11`.
    pub months: i32,
}

impl YearMonth {
    pub fn total_months(&self) -> i32 {
        self.years * 12 + self.months
    }
}

/// Calendar difference: the month delta drops by one when `end`'s day of month
/// is before `start`'s, then months are folded into `0..=11`.
pub fn diff_year_month(start: NaiveDate, end: NaiveDate) -> YearMonth {
    let mut years = end.year() - start.year();
    let mut months = end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    YearMonth { years, months }
}

/// Round to one decimal place, halves away from zero.
pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
