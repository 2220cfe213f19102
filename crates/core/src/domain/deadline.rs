// Deadline Domain Model
//
// A deadline is parsed once and never mutated. Accepted inputs mirror what a
// browser date parser takes from a `data-time` attribute.

use super::error::{DomainError, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// ISO date-times with an offset that RFC 3339 rejects (no seconds, space separator)
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Date-time layouts without an offset; interpreted as local time
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M:%S",
];

/// Long-form dates without a time; local midnight
const LOCAL_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%Y/%m/%d"];

/// ISO calendar date; UTC midnight
const UTC_DATE_FORMAT: &str = "%Y-%m-%d";

/// Immutable instant the countdown measures against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline {
    at: DateTime<Utc>,
}

impl Deadline {
    /// Parse a deadline from a timestamp string
    ///
    /// Tried in order: RFC 3339, RFC 2822, ISO-8601 with offset but without
    /// seconds, offset-less ISO-8601 and long
    /// English forms (local time), bare ISO date (UTC midnight).
    ///
    /// # Errors
    /// `DomainError::InvalidDeadline` if no format matches.
    pub fn parse(raw: &str) -> Result<Self> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(DomainError::InvalidDeadline("empty timestamp".to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self::from(dt.with_timezone(&Utc)));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
            return Ok(Self::from(dt.with_timezone(&Utc)));
        }

        for format in OFFSET_DATETIME_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(input, format) {
                return Ok(Self::from(dt.with_timezone(&Utc)));
            }
        }

        for format in LOCAL_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                return Self::from_local(naive, input);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, UTC_DATE_FORMAT) {
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| DomainError::InvalidDeadline(input.to_string()))?;
            return Ok(Self::from(Utc.from_utc_datetime(&midnight)));
        }

        for format in LOCAL_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(input, format) {
                let midnight = date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| DomainError::InvalidDeadline(input.to_string()))?;
                return Self::from_local(midnight, input);
            }
        }

        Err(DomainError::InvalidDeadline(input.to_string()))
    }

    /// Build a deadline from epoch milliseconds
    pub fn from_millis(millis: i64) -> Result<Self> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Self::from)
            .ok_or(DomainError::DeadlineOutOfRange(millis))
    }

    /// Epoch milliseconds (UTC)
    pub fn as_millis(&self) -> i64 {
        self.at.timestamp_millis()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.at
    }

    /// Signed milliseconds from `now_millis` until the deadline
    pub fn remaining_millis(&self, now_millis: i64) -> i64 {
        self.as_millis().saturating_sub(now_millis)
    }

    fn from_local(naive: NaiveDateTime, input: &str) -> Result<Self> {
        // Non-existent local times (DST gap) have no instant to count down to
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| Self::from(dt.with_timezone(&Utc)))
            .ok_or_else(|| DomainError::InvalidDeadline(input.to_string()))
    }
}

impl From<DateTime<Utc>> for Deadline {
    fn from(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl FromStr for Deadline {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.at.to_rfc3339())
    }
}
