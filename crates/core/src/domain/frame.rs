// Render Frame - formatted slot values for one tick

use super::remaining::TimeRemaining;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four addressable text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Days, Slot::Hours, Slot::Minutes, Slot::Seconds];

    /// Stable identifier (`"days"`, `"hours"`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Days => "days",
            Slot::Hours => "hours",
            Slot::Minutes => "minutes",
            Slot::Seconds => "seconds",
        }
    }

    /// Class name of the slot element on the promo page
    pub fn class_name(&self) -> &'static str {
        match self {
            Slot::Days => "promo__days",
            Slot::Hours => "promo__hours",
            Slot::Minutes => "promo__minutes",
            Slot::Seconds => "promo__seconds",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fully formatted values for a single render
///
/// Built completely before it reaches a render target, so a target never
/// observes a half-updated tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl Frame {
    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Days => &self.days,
            Slot::Hours => &self.hours,
            Slot::Minutes => &self.minutes,
            Slot::Seconds => &self.seconds,
        }
    }

    /// Slots in display order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

impl From<&TimeRemaining> for Frame {
    fn from(remaining: &TimeRemaining) -> Self {
        Self {
            days: remaining.days.to_string(),
            hours: pad2(remaining.hours),
            minutes: pad2(remaining.minutes),
            seconds: pad2(remaining.seconds),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}:{}:{}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Left-pad to two characters, keeping the last two
///
/// `5` -> `"05"`, `42` -> `"42"`, `-1` -> `"-1"`.
fn pad2(value: i64) -> String {
    let padded = format!("0{value}");
    padded[padded.len() - 2..].to_string()
}
