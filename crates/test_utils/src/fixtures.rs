//! Canned scenarios for cancellation tests

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, UserId};
use rust_decimal::Decimal;

use domain_booking::{Booking, Trip};

use crate::builders::{BookingBuilder, TripBuilder};

/// A fixed reference instant all fixture scenarios are anchored to
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
}

/// A confirmed booking on a trip departing `hours` hours after
/// [`reference_now`], priced at `amount`
///
/// Returns the trip, the booking, and the reference instant to pass as the
/// policy's `now`.
pub fn booking_departing_in(
    hours: i64,
    amount: Decimal,
    currency: Currency,
) -> (Trip, Booking, DateTime<Utc>) {
    let now = reference_now();
    let driver = UserId::new();
    let passenger = UserId::new();

    let trip = TripBuilder::new()
        .with_driver(driver)
        .departing_hours_after(now, hours)
        .build();
    let booking = BookingBuilder::new()
        .on_trip(&trip)
        .with_passenger(passenger)
        .with_total_price(amount, currency)
        .confirmed()
        .build();

    (trip, booking, now)
}
