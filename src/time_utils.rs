// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a timestamp leniently.
///
/// Accepts RFC3339 with any offset (converted to UTC), or a naive
/// date-time which is taken to already be UTC. Anything else is `None`.
pub fn parse_utc_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// ISO week-year and week number (1..=53).
pub fn iso_year_week(date: DateTime<Utc>) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_strava_local_format() {
        let dt = parse_utc_lenient("2025-03-04T06:15:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 4, 6, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_offset_is_converted_to_utc() {
        let dt = parse_utc_lenient("2025-03-04T08:15:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 4, 6, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 6, 15, 0).unwrap();
        assert_eq!(parse_utc_lenient("2025-03-04T06:15:00"), Some(expected));
        assert_eq!(parse_utc_lenient("2025-03-04 06:15:00"), Some(expected));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_utc_lenient("yesterday morning"), None);
        assert_eq!(parse_utc_lenient(""), None);
        assert_eq!(parse_utc_lenient("2025-13-40T99:00:00Z"), None);
    }

    #[test]
    fn test_iso_week_crosses_calendar_year() {
        // Monday 2024-12-30 belongs to ISO week 1 of 2025.
        let dt = Utc.with_ymd_and_hms(2024, 12, 30, 7, 0, 0).unwrap();
        assert_eq!(iso_year_week(dt), (2025, 1));

        // Friday 2021-01-01 belongs to ISO week 53 of 2020.
        let dt = Utc.with_ymd_and_hms(2021, 1, 1, 7, 0, 0).unwrap();
        assert_eq!(iso_year_week(dt), (2020, 53));
    }

    #[test]
    fn test_format_utc_rfc3339() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 4, 6, 15, 0).unwrap();
        assert_eq!(format_utc_rfc3339(dt), "2025-03-04T06:15:00Z");
    }
}
