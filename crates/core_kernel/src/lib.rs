//! Core Kernel - Foundational types for the ride-sharing platform
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for departure instants and cancellation windows
//! - Strongly-typed identifiers
//! - Port abstractions shared by all adapters

pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{BookingId, NotificationId, TransactionId, TripId, UserId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{DomainPort, PortError};
pub use temporal::{hours_until, TemporalError, Timezone};
