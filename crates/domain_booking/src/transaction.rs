//! Ledger transfer records
//!
//! A cancellation produces at most two money movements: a refund credit to
//! the passenger and a fee transfer to the counter-party. Transfers are
//! immutable once recorded; corrections are new records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BookingId, Money, TransactionId, UserId};

/// Transfer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    /// Returns the database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransferStatus::Pending),
            "completed" => Ok(TransferStatus::Completed),
            "failed" => Ok(TransferStatus::Failed),
            other => Err(format!("Unknown transfer status: {}", other)),
        }
    }
}

/// A money movement between two users, tied to a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique identifier
    pub id: TransactionId,
    /// The booking this movement settles
    pub booking_id: BookingId,
    /// Paying party
    pub sender_id: UserId,
    /// Receiving party
    pub receiver_id: UserId,
    /// Amount moved (carries the booking's currency)
    pub amount: Money,
    /// Status
    pub status: TransferStatus,
    /// Free-text description
    pub description: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// When the transfer completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transfer {
    /// Creates a completed refund credit to the passenger
    ///
    /// The refund is described with the policy reason so the passenger can
    /// see which tier applied.
    pub fn refund(
        booking_id: BookingId,
        sender_id: UserId,
        passenger_id: UserId,
        amount: Money,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new_v7(),
            booking_id,
            sender_id,
            receiver_id: passenger_id,
            amount,
            status: TransferStatus::Completed,
            description: description.into(),
            created_at: now,
            completed_at: Some(now),
        }
    }

    /// Creates a completed cancellation-fee transfer from the canceller to
    /// the counter-party
    pub fn cancellation_fee(
        booking_id: BookingId,
        canceller_id: UserId,
        recipient_id: UserId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new_v7(),
            booking_id,
            sender_id: canceller_id,
            receiver_id: recipient_id,
            amount,
            status: TransferStatus::Completed,
            description: "Cancellation fee".to_string(),
            created_at: now,
            completed_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_refund_is_completed_and_described() {
        let now = Utc::now();
        let passenger = UserId::new();
        let transfer = Transfer::refund(
            BookingId::new(),
            UserId::new(),
            passenger,
            Money::new(dec!(40), Currency::EUR),
            "50% cancellation fee (12-24 hours before departure)",
            now,
        );

        assert_eq!(transfer.status, TransferStatus::Completed);
        assert_eq!(transfer.receiver_id, passenger);
        assert_eq!(transfer.completed_at, Some(now));
        assert!(transfer.description.contains("50%"));
    }

    #[test]
    fn test_fee_transfer_direction() {
        let now = Utc::now();
        let canceller = UserId::new();
        let recipient = UserId::new();
        let transfer = Transfer::cancellation_fee(
            BookingId::new(),
            canceller,
            recipient,
            Money::new(dec!(25), Currency::EUR),
            now,
        );

        assert_eq!(transfer.sender_id, canceller);
        assert_eq!(transfer.receiver_id, recipient);
        assert_eq!(transfer.description, "Cancellation fee");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::Completed,
            TransferStatus::Failed,
        ] {
            let parsed: TransferStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
