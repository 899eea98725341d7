//! Repository implementations of the booking domain ports

pub mod bookings;
pub mod ledger;
pub mod notifications;

pub use bookings::PgBookingStore;
pub use ledger::PgTransactionLedger;
pub use notifications::PgNotificationOutbox;
