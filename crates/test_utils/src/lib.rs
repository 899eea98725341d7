//! Shared test utilities for the ride-sharing test suite
//!
//! Builders and fixtures used by the domain test suites. Not part of the
//! production dependency graph.

pub mod builders;
pub mod fixtures;

pub use builders::{BookingBuilder, TripBuilder};
pub use fixtures::{booking_departing_in, reference_now};
