//! Shared utility functions for HTK crates.

/// Date and timestamp utility functions
pub mod dates {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

    /// Timestamp formats accepted for naive (offset-free) values, tried in order.
    pub const NAIVE_TIMESTAMP_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y%m%d %H%M",
        "%Y/%m/%d %H:%M",
    ];

    /// Timestamp formats carrying a UTC offset, e.g. "1950-08-12 00:00:00+00:00".
    pub const OFFSET_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

    /// Date-only formats, interpreted as midnight.
    pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

    /// Format a NaiveDateTime as "YYYY-MM-DD HH:MM:SS"
    pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
        timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Parse a timestamp leniently, returning `None` for anything unparseable.
    ///
    /// Offset-aware values are converted to UTC and the offset is dropped, so
    /// every accepted value ends up as a naive UTC timestamp.
    pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        for format in OFFSET_TIMESTAMP_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Some(dt.naive_utc());
            }
        }
        for format in NAIVE_TIMESTAMP_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
                return Some(ts);
            }
        }
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
            .map(|date| date.and_time(NaiveTime::MIN))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[test]
        fn test_parse_timestamp_naive_formats() {
            let ts = parse_timestamp("1950-08-12 06:00:00").unwrap();
            assert_eq!(ts.year(), 1950);
            assert_eq!(ts.hour(), 6);

            let ts = parse_timestamp("19500812 1800").unwrap();
            assert_eq!(ts.day(), 12);
            assert_eq!(ts.hour(), 18);

            let ts = parse_timestamp("1950-08-12T12:00:00").unwrap();
            assert_eq!(ts.hour(), 12);
        }

        #[test]
        fn test_parse_timestamp_with_offset_converts_to_utc() {
            let ts = parse_timestamp("1950-08-12 00:00:00+00:00").unwrap();
            assert_eq!(format_timestamp(&ts), "1950-08-12 00:00:00");

            let ts = parse_timestamp("1950-08-12T03:00:00+02:00").unwrap();
            assert_eq!(format_timestamp(&ts), "1950-08-12 01:00:00");
        }

        #[test]
        fn test_parse_timestamp_date_only() {
            let ts = parse_timestamp("1961-03-01").unwrap();
            assert_eq!(format_timestamp(&ts), "1961-03-01 00:00:00");
        }

        #[test]
        fn test_parse_timestamp_invalid() {
            assert!(parse_timestamp("").is_none());
            assert!(parse_timestamp("   ").is_none());
            assert!(parse_timestamp("not a date").is_none());
            assert!(parse_timestamp("1950-13-40 00:00:00").is_none());
        }

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let parsed = parse_date("2023-06-15").unwrap();
            assert_eq!(parsed, date);
            assert!(parse_date("2023/06/15").is_err());
        }
    }
}

/// Year axis helpers
pub mod years {
    /// Clamp a year into `[min, max]`.
    pub fn clamp_year(year: i32, min: i32, max: i32) -> i32 {
        year.max(min).min(max)
    }

    /// Inclusive membership test on a year span.
    pub fn within(year: i32, start: i32, end: i32) -> bool {
        start <= year && year <= end
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_clamp_year() {
            assert_eq!(clamp_year(1900, 1950, 2020), 1950);
            assert_eq!(clamp_year(2030, 1950, 2020), 2020);
            assert_eq!(clamp_year(1980, 1950, 2020), 1980);
        }

        #[test]
        fn test_within_is_inclusive() {
            assert!(within(1950, 1950, 1960));
            assert!(within(1960, 1950, 1960));
            assert!(!within(1961, 1950, 1960));
        }
    }
}
