//! Booking domain errors

use core_kernel::{MoneyError, PortError, TemporalError};
use thiserror::Error;

/// Errors that can occur in the booking domain
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Cancellation refused by policy. The reason is built from the policy
    /// assessment before any write happens, so it is safe to show verbatim.
    #[error("{reason}")]
    NotCancellable { reason: String },

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// A store write or read failed; propagated unchanged, no retry.
    #[error(transparent)]
    Store(#[from] PortError),
}
