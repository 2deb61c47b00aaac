//! Date parsing helpers shared by the history store and the query engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a persisted or user-supplied date, dropping any time-of-day.
///
/// Accepts:
/// - `YYYY-MM-DD`
/// - `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`
/// - RFC3339 instants
/// - `M/D/YYYY`
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    parse_month_day_year(s)
}

/// Build a date from `Month/Day/Year` parts as found in DAT records.
pub fn date_from_parts(month: i64, day: i64, year: i64) -> Option<NaiveDate> {
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_month_day_year(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let month = parts.next()?.trim().parse().ok()?;
    let day = parts.next()?.trim().parse().ok()?;
    let year = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    date_from_parts(month, day, year)
}
