//! Cancellation orchestration
//!
//! `CancellationService` applies the fee policy to a persisted booking and
//! issues the resulting writes: the status update, the refund and fee
//! transfers, and the counter-party notification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use core_kernel::{BookingId, Money, UserId};

use crate::error::BookingError;
use crate::notification::Notification;
use crate::policy::{assess_cancellation, CancellationAssessment};
use crate::ports::{BookedTrip, BookingStore, NotificationOutbox, TransactionLedger};
use crate::transaction::Transfer;

/// Maximum number of entries returned by the cancellation history query
pub const CANCELLATION_HISTORY_LIMIT: u32 = 20;

/// Who initiated a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellerRole {
    Driver,
    Passenger,
}

impl fmt::Display for CancellerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancellerRole::Driver => write!(f, "driver"),
            CancellerRole::Passenger => write!(f, "passenger"),
        }
    }
}

/// Result of a successful cancellation
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    /// The policy assessment that was applied
    pub assessment: CancellationAssessment,
    /// The amount credited back to the passenger
    pub refund: Money,
}

/// Service orchestrating booking cancellations
///
/// The writes in `cancel_booking` are issued sequentially and are not
/// wrapped in one atomic transaction: a failure after the status update can
/// leave the refund, fee, or notification unrecorded. Errors propagate to
/// the caller unchanged, with no retry and no compensation.
pub struct CancellationService {
    bookings: Arc<dyn BookingStore>,
    ledger: Arc<dyn TransactionLedger>,
    notifications: Arc<dyn NotificationOutbox>,
}

impl CancellationService {
    /// Creates a new cancellation service over the given ports
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        ledger: Arc<dyn TransactionLedger>,
        notifications: Arc<dyn NotificationOutbox>,
    ) -> Self {
        Self {
            bookings,
            ledger,
            notifications,
        }
    }

    /// Cancels a booking at the current wall-clock time
    ///
    /// See [`CancellationService::cancel_booking_at`].
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        acting_user: UserId,
        reason: &str,
        role: CancellerRole,
    ) -> Result<CancellationOutcome, BookingError> {
        self.cancel_booking_at(booking_id, acting_user, reason, role, Utc::now())
            .await
    }

    /// Cancels a booking at reference time `now`
    ///
    /// Fetches the booking joined with its trip, assesses the fee policy,
    /// and when cancellation is allowed: marks the booking cancelled,
    /// credits the passenger with `total - fee` if positive, transfers the
    /// fee from the canceller to the counter-party if positive, and
    /// notifies the counter-party.
    ///
    /// # Errors
    ///
    /// - `BookingError::BookingNotFound` when the id does not resolve
    /// - `BookingError::NotCancellable` when the trip has already departed;
    ///   no write has happened at that point
    /// - `BookingError::Store` when any underlying write fails
    pub async fn cancel_booking_at(
        &self,
        booking_id: BookingId,
        acting_user: UserId,
        reason: &str,
        role: CancellerRole,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, BookingError> {
        let BookedTrip { booking, trip } =
            self.bookings
                .booking_with_trip(booking_id)
                .await
                .map_err(|e| {
                    if e.is_not_found() {
                        BookingError::BookingNotFound(booking_id.to_string())
                    } else {
                        BookingError::Store(e)
                    }
                })?;

        let departs_at = trip.departs_at()?;
        let assessment = assess_cancellation(departs_at, booking.total_price, now);

        if !assessment.can_cancel {
            warn!(
                booking_id = %booking_id,
                hours_before_departure = assessment.hours_before_departure,
                "cancellation refused by policy"
            );
            return Err(BookingError::NotCancellable {
                reason: assessment.reason,
            });
        }

        self.bookings
            .mark_cancelled(booking_id, now, acting_user, reason)
            .await?;

        let refund = booking.total_price.checked_sub(&assessment.fee)?;
        if refund.is_positive() {
            self.ledger
                .record(Transfer::refund(
                    booking.id,
                    trip.driver_id,
                    booking.passenger_id,
                    refund,
                    &assessment.reason,
                    now,
                ))
                .await?;
        }

        if assessment.fee.is_positive() {
            let fee_recipient = match role {
                CancellerRole::Driver => booking.passenger_id,
                CancellerRole::Passenger => trip.driver_id,
            };
            self.ledger
                .record(Transfer::cancellation_fee(
                    booking.id,
                    acting_user,
                    fee_recipient,
                    assessment.fee,
                    now,
                ))
                .await?;
        }

        let counter_party = match role {
            CancellerRole::Driver => booking.passenger_id,
            CancellerRole::Passenger => trip.driver_id,
        };
        let message = format!(
            "Your booking was cancelled by the {}. {}",
            role, assessment.reason
        );
        self.notifications
            .push(Notification::booking_cancelled(
                counter_party,
                booking.id,
                message,
                now,
            ))
            .await?;

        info!(
            booking_id = %booking_id,
            role = %role,
            fee = %assessment.fee,
            refund = %refund,
            "booking cancelled"
        );

        Ok(CancellationOutcome { assessment, refund })
    }

    /// Percentage (0-100) of a passenger's bookings that are cancelled
    ///
    /// Returns 0.0 for a passenger with no bookings.
    pub async fn cancellation_rate(&self, passenger_id: UserId) -> Result<f64, BookingError> {
        let counts = self
            .bookings
            .passenger_booking_counts(passenger_id)
            .await?;
        if counts.total == 0 {
            return Ok(0.0);
        }
        Ok(counts.cancelled as f64 / counts.total as f64 * 100.0)
    }

    /// The user's most recent cancelled bookings, newest first
    ///
    /// Includes bookings where the user was the passenger or performed the
    /// cancellation, capped at [`CANCELLATION_HISTORY_LIMIT`].
    pub async fn cancellation_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BookedTrip>, BookingError> {
        Ok(self
            .bookings
            .cancellation_history(user_id, CANCELLATION_HISTORY_LIMIT)
            .await?)
    }
}
