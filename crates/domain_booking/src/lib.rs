//! Booking Domain
//!
//! Trips, bookings, and the cancellation policy engine: the tiered fee
//! calculation, the orchestration that applies it against the booking
//! store, and the cancellation rate/history queries.
//!
//! # Booking Lifecycle
//!
//! ```text
//! Pending -> Confirmed -> Completed
//!    \           \
//!     `-----------`-> Cancelled (at most once)
//! ```

pub mod booking;
pub mod error;
pub mod notification;
pub mod policy;
pub mod ports;
pub mod service;
pub mod transaction;
pub mod trip;

pub use booking::{Booking, BookingStatus};
pub use error::BookingError;
pub use notification::{Notification, NotificationKind, NotificationPriority};
pub use policy::{assess_cancellation, CancellationAssessment, FeeTier};
pub use ports::{BookedTrip, BookingStore, NotificationOutbox, PassengerBookingCounts, TransactionLedger};
pub use service::{CancellationOutcome, CancellationService, CancellerRole, CANCELLATION_HISTORY_LIMIT};
pub use transaction::{Transfer, TransferStatus};
pub use trip::Trip;
