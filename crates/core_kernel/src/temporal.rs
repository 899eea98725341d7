//! Time handling for trip departures
//!
//! Trips store a local departure date and time-of-day in the timezone of the
//! departure city. Everything downstream (fee tiers, cancellation windows)
//! works on the combined UTC instant produced here.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    /// The local date+time does not exist or is ambiguous in the timezone
    /// (daylight-saving gaps and overlaps)
    #[error("Unrepresentable local time {datetime} in timezone {timezone}")]
    UnrepresentableLocalTime {
        datetime: String,
        timezone: String,
    },
}

/// Timezone wrapper for departure locations
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the IANA name of the timezone
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Combines a local date and time-of-day into a UTC instant
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::UnrepresentableLocalTime` when the local
    /// datetime falls into a daylight-saving gap or overlap.
    pub fn instant(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, TemporalError> {
        date.and_time(time)
            .and_local_timezone(self.0)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TemporalError::UnrepresentableLocalTime {
                datetime: date.and_time(time).to_string(),
                timezone: self.0.name().to_string(),
            })
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

impl FromStr for Timezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s).map(Timezone).map_err(|e| e.to_string())
    }
}

/// Signed fractional hours between `now` and a future instant
///
/// Positive while the instant is still ahead, negative once it has passed.
/// Computed at millisecond precision so values close to a tier boundary
/// resolve consistently.
pub fn hours_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (instant - now).num_milliseconds() as f64 / 3_600_000.0
}
