//! Date values, stored as milliseconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// A point in time. An invalid date holds `NaN`.
#[derive(Clone, Copy, Debug)]
pub struct Date(f64);

impl Date {
    pub const EPOCH: Date = Date(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    pub fn invalid() -> Self {
        Self(f64::NAN)
    }

    pub fn millis(&self) -> f64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
    }

    /// Parses an ISO 8601 date, date-time or zoned date-time. Date-times
    /// without an offset are taken as UTC.
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self(dt.timestamp_millis() as f64));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self(dt.and_utc().timestamp_millis() as f64));
            }
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        let dt = date.and_hms_opt(0, 0, 0)?;
        Some(Self(dt.and_utc().timestamp_millis() as f64))
    }

    /// RFC 3339 rendering in UTC with millisecond precision.
    pub fn to_iso_string(&self) -> Option<String> {
        if !self.is_valid() {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis(self.0 as i64)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_date_as_utc_midnight() {
        let d = Date::parse("2024-01-01").unwrap();
        assert_eq!(d.millis(), 1_704_067_200_000.0);
    }

    #[test]
    fn parses_zoned_date_time() {
        let d = Date::parse("2024-01-01T01:00:00+01:00").unwrap();
        assert_eq!(d.millis(), 1_704_067_200_000.0);
    }

    #[test]
    fn parses_unzoned_date_time_as_utc() {
        let d = Date::parse("1970-01-01T00:00:01.500").unwrap();
        assert_eq!(d.millis(), 1500.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Date::parse("2024-13-45").is_none());
        assert!(Date::parse("tomorrow").is_none());
    }

    #[test]
    fn iso_string() {
        assert_eq!(
            Date::EPOCH.to_iso_string().as_deref(),
            Some("1970-01-01T00:00:00.000Z")
        );
        assert_eq!(Date::invalid().to_iso_string(), None);
    }
}
