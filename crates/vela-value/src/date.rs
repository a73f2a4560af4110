use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// A point in time as milliseconds since the Unix epoch.
///
/// A NaN time value is an *invalid date*: it is still date-shaped, but has no
/// usable instant. Schemas report that case separately from a type mismatch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Date(f64);

impl Date {
    pub fn from_millis(millis: f64) -> Self {
        Self(millis)
    }

    pub fn invalid() -> Self {
        Self(f64::NAN)
    }

    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Parses RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps
    /// (taken as UTC) and bare `YYYY-MM-DD` dates (UTC midnight). Anything else
    /// yields an invalid date.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
            return Self(parsed.timestamp_millis() as f64);
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
            return Self(parsed.and_utc().timestamp_millis() as f64);
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
            && let Some(midnight) = parsed.and_hms_opt(0, 0, 0)
        {
            return Self(midnight.and_utc().timestamp_millis() as f64);
        }
        Self::invalid()
    }

    pub fn timestamp_millis(&self) -> f64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_nan()
    }

    pub fn to_chrono(&self) -> Option<DateTime<Utc>> {
        if !self.is_valid() {
            return None;
        }
        DateTime::from_timestamp_millis(self.0 as i64)
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis() as f64)
    }
}

impl core::fmt::Display for Date {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_chrono() {
            Some(instant) => write!(f, "{}", instant.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => write!(f, "Invalid Date"),
        }
    }
}
