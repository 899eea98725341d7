//! Trip entity

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, TemporalError, Timezone, TripId, UserId};

/// A scheduled ride offered by a driver
///
/// The departure is stored as a local date and time-of-day in the timezone
/// of the origin city; `departs_at` combines them into the UTC instant the
/// cancellation policy works with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier
    pub id: TripId,
    /// Driver offering the ride
    pub driver_id: UserId,
    /// Origin city
    pub origin: String,
    /// Destination city
    pub destination: String,
    /// Local departure date
    pub departure_date: NaiveDate,
    /// Local departure time-of-day
    pub departure_time: NaiveTime,
    /// Timezone of the origin
    pub timezone: Timezone,
    /// Price per seat
    pub price_per_seat: Money,
    /// Seats offered
    pub seats_total: u32,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Creates a new trip
    pub fn new(
        driver_id: UserId,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
        departure_time: NaiveTime,
        timezone: Timezone,
        price_per_seat: Money,
        seats_total: u32,
    ) -> Self {
        Self {
            id: TripId::new_v7(),
            driver_id,
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            departure_time,
            timezone,
            price_per_seat,
            seats_total,
            created_at: Utc::now(),
        }
    }

    /// The departure instant in UTC
    pub fn departs_at(&self) -> Result<DateTime<Utc>, TemporalError> {
        self.timezone.instant(self.departure_date, self.departure_time)
    }
}
