//! Booking aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BookingId, Money, TripId, UserId};

use crate::error::BookingError;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested, awaiting driver confirmation
    Pending,
    /// Confirmed by the driver
    Confirmed,
    /// Cancelled before departure
    Cancelled,
    /// Trip completed
    Completed,
}

impl BookingStatus {
    /// Returns the database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// A passenger's reservation of seats on a trip
///
/// Cancellation metadata is populated exactly once, when the booking
/// transitions to `Cancelled`; the transition is never reverted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: BookingId,
    /// The trip being booked
    pub trip_id: TripId,
    /// The passenger who made the booking
    pub passenger_id: UserId,
    /// Number of seats reserved
    pub seats: u32,
    /// Total price for all seats
    pub total_price: Money,
    /// Status
    pub status: BookingStatus,
    /// When the booking was cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Who performed the cancellation
    pub cancelled_by: Option<UserId>,
    /// Free-text cancellation reason
    pub cancellation_reason: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new pending booking
    pub fn new(trip_id: TripId, passenger_id: UserId, seats: u32, total_price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: BookingId::new_v7(),
            trip_id,
            passenger_id,
            seats,
            total_price,
            status: BookingStatus::Pending,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Confirms a pending booking
    pub fn confirm(&mut self) -> Result<(), BookingError> {
        self.transition_to(BookingStatus::Confirmed)
    }

    /// Marks the booking completed after the trip
    pub fn complete(&mut self) -> Result<(), BookingError> {
        self.transition_to(BookingStatus::Completed)
    }

    /// Cancels the booking, recording who did it, when, and why
    pub fn cancel(
        &mut self,
        cancelled_at: DateTime<Utc>,
        cancelled_by: UserId,
        reason: impl Into<String>,
    ) -> Result<(), BookingError> {
        self.transition_to(BookingStatus::Cancelled)?;
        self.cancelled_at = Some(cancelled_at);
        self.cancelled_by = Some(cancelled_by);
        self.cancellation_reason = Some(reason.into());
        Ok(())
    }

    fn transition_to(&mut self, target: BookingStatus) -> Result<(), BookingError> {
        if !self.can_transition_to(target) {
            return Err(BookingError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self.status, target),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn booking() -> Booking {
        Booking::new(
            TripId::new(),
            UserId::new(),
            2,
            Money::new(dec!(50), Currency::EUR),
        )
    }

    #[test]
    fn test_new_booking_is_pending() {
        let b = booking();
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(b.cancelled_at.is_none());
    }

    #[test]
    fn test_cancel_records_metadata() {
        let mut b = booking();
        let canceller = b.passenger_id;
        let now = Utc::now();

        b.cancel(now, canceller, "Change of plans").unwrap();

        assert_eq!(b.status, BookingStatus::Cancelled);
        assert_eq!(b.cancelled_at, Some(now));
        assert_eq!(b.cancelled_by, Some(canceller));
        assert_eq!(b.cancellation_reason.as_deref(), Some("Change of plans"));
    }

    #[test]
    fn test_cancel_twice_is_rejected() {
        let mut b = booking();
        let canceller = b.passenger_id;
        b.cancel(Utc::now(), canceller, "first").unwrap();

        let result = b.cancel(Utc::now(), canceller, "second");
        assert!(matches!(
            result,
            Err(BookingError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_completed_booking_cannot_be_cancelled() {
        let mut b = booking();
        b.confirm().unwrap();
        b.complete().unwrap();

        let result = b.cancel(Utc::now(), b.passenger_id, "too late");
        assert!(result.is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let parsed: BookingStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
