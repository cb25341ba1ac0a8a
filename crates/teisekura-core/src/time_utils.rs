use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{Result, TeisekuraError};

// ── Registry constants ────────────────────────────────────────────────────────

/// First day of the registry window; statutes registered or entering force
/// before this date are out of scope.
pub fn registry_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or(NaiveDate::MIN)
}

// ── Quarter arithmetic ────────────────────────────────────────────────────────

/// Map a calendar month (1–12) to its quarter (1–4).
///
/// ```
/// use teisekura_core::time_utils::quarter_of_month;
///
/// assert_eq!(quarter_of_month(1), 1);
/// assert_eq!(quarter_of_month(6), 2);
/// assert_eq!(quarter_of_month(12), 4);
/// ```
pub fn quarter_of_month(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// Quarter (1–4) containing `date`.
pub fn quarter_of(date: NaiveDate) -> u32 {
    quarter_of_month(date.month())
}

/// First day of the quarter containing `date`.
pub fn start_of_quarter(date: NaiveDate) -> NaiveDate {
    let start_month = (quarter_of(date) - 1) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), start_month, 1).unwrap_or(date)
}

/// Last day of the quarter before the one containing `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use teisekura_core::time_utils::end_of_previous_quarter;
///
/// let d = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
/// assert_eq!(end_of_previous_quarter(d), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
/// ```
pub fn end_of_previous_quarter(date: NaiveDate) -> NaiveDate {
    start_of_quarter(date) - Duration::days(1)
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Strictly parse a user-supplied ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TeisekuraError::InvalidDate(s.to_string()))
}

/// Leniently parse a date cell from the registry export.
///
/// Accepts a bare `YYYY-MM-DD`, a naive date-time in `T` or space form (with
/// optional fractional seconds) and RFC 3339. Empty or unrecognised input is
/// `None`; this never fails.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    debug!("could not parse date cell \"{}\"", s);
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
