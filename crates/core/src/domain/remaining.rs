// Time Remaining Value Object
//
// Recomputed from the absolute deadline on every tick, never decremented.

use serde::{Deserialize, Serialize};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// How the final (expired) tick is decomposed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryDisplay {
    /// Every component is zero once the deadline has passed
    #[default]
    Zeroed,
    /// Floor of the truncated remainder per component, which goes
    /// negative (`-1`) for a deadline already behind us
    Floored,
}

impl ExpiryDisplay {
    pub fn decompose(self, total_millis: i64) -> TimeRemaining {
        match self {
            ExpiryDisplay::Zeroed => TimeRemaining::from_millis(total_millis),
            ExpiryDisplay::Floored => TimeRemaining::floored(total_millis),
        }
    }
}

/// Countdown components for one tick
///
/// For a positive `total_millis` the fields satisfy
/// `days*86400 + hours*3600 + minutes*60 + seconds == total_millis / 1000`,
/// with `hours` in 0..24 and `minutes`/`seconds` in 0..60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub total_millis: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    /// Decompose with floor division, clamping to zero at or after expiry
    pub fn from_millis(total_millis: i64) -> Self {
        if total_millis <= 0 {
            return Self {
                total_millis,
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
            };
        }

        Self {
            total_millis,
            days: total_millis.div_euclid(MILLIS_PER_DAY),
            hours: total_millis.div_euclid(MILLIS_PER_HOUR).rem_euclid(24),
            minutes: total_millis.div_euclid(MILLIS_PER_MINUTE).rem_euclid(60),
            seconds: total_millis.div_euclid(MILLIS_PER_SECOND).rem_euclid(60),
        }
    }

    /// Decompose with a truncating remainder, then floor
    ///
    /// Identical to [`TimeRemaining::from_millis`] for positive input. For a
    /// negative total each component is `floor((total / unit) % modulus)` with a
    /// truncating `%`, so one millisecond past the deadline reads `-1` everywhere.
    pub fn floored(total_millis: i64) -> Self {
        if total_millis > 0 {
            return Self::from_millis(total_millis);
        }

        let component = |unit: i64, modulus: Option<i64>| -> i64 {
            let scaled = total_millis as f64 / unit as f64;
            let wrapped = match modulus {
                Some(m) => scaled % m as f64,
                None => scaled,
            };
            wrapped.floor() as i64
        };

        Self {
            total_millis,
            days: component(MILLIS_PER_DAY, None),
            hours: component(MILLIS_PER_HOUR, Some(24)),
            minutes: component(MILLIS_PER_MINUTE, Some(60)),
            seconds: component(MILLIS_PER_SECOND, Some(60)),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.total_millis <= 0
    }

    /// Whole seconds represented by the components
    pub fn total_seconds(&self) -> i64 {
        (self.days * MILLIS_PER_DAY
            + self.hours * MILLIS_PER_HOUR
            + self.minutes * MILLIS_PER_MINUTE
            + self.seconds * MILLIS_PER_SECOND)
            / MILLIS_PER_SECOND
    }
}
