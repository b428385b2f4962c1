//! Timestamp helpers
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC
//! (`2026-08-27T12:00:00.000Z`), so lexicographic comparison in SurrealQL is
//! chronological. Date-range queries rely on this.

use chrono::{NaiveDate, SecondsFormat, Utc};

use crate::utils::AppError;

/// Current time as a fixed-width RFC 3339 UTC string
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a `YYYY-MM-DD` date into the timestamp of its first instant (UTC)
pub fn day_start(date: &str, field: &str) -> Result<String, AppError> {
    let day = parse_day(date, field)?;
    Ok(format!("{}T00:00:00.000Z", day.format("%Y-%m-%d")))
}

/// Parse a `YYYY-MM-DD` date into the timestamp of the *next* day's first
/// instant, for exclusive upper bounds on an inclusive date range
pub fn day_end_exclusive(date: &str, field: &str) -> Result<String, AppError> {
    let day = parse_day(date, field)?;
    let next = day
        .succ_opt()
        .ok_or_else(|| AppError::field(field, format!("{field} is out of range")))?;
    Ok(format!("{}T00:00:00.000Z", next.format("%Y-%m-%d")))
}

fn parse_day(date: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::field(field, format!("{field} must be a YYYY-MM-DD date")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_fixed_width() {
        let now = now_rfc3339();
        assert_eq!(now.len(), "2026-08-27T12:00:00.000Z".len());
        assert!(now.ends_with('Z'));
    }

    #[test]
    fn day_bounds() {
        assert_eq!(day_start("2026-08-27", "start_date").unwrap(), "2026-08-27T00:00:00.000Z");
        assert_eq!(
            day_end_exclusive("2026-08-27", "end_date").unwrap(),
            "2026-08-28T00:00:00.000Z"
        );
        // month rollover
        assert_eq!(
            day_end_exclusive("2026-08-31", "end_date").unwrap(),
            "2026-09-01T00:00:00.000Z"
        );
    }

    #[test]
    fn bad_dates_are_field_errors() {
        assert!(day_start("27-08-2026", "start_date").is_err());
        assert!(day_start("2026-02-30", "start_date").is_err());
    }
}
