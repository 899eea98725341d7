//! Test Data Builders
//!
//! Builder patterns for constructing test trips and bookings with sensible
//! defaults, so tests only specify the fields they care about.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use core_kernel::{Currency, Money, Timezone, TripId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_booking::{Booking, BookingStatus, Trip};

/// Builder for test trips
pub struct TripBuilder {
    driver_id: UserId,
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    timezone: Timezone,
    price_per_seat: Money,
    seats_total: u32,
}

impl Default for TripBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TripBuilder {
    /// Creates a builder with default values (a EUR trip departing at noon
    /// UTC on 2024-09-01)
    pub fn new() -> Self {
        Self {
            driver_id: UserId::new(),
            origin: "Lyon".to_string(),
            destination: "Paris".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            departure_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            timezone: Timezone::default(),
            price_per_seat: Money::new(dec!(25), Currency::EUR),
            seats_total: 3,
        }
    }

    /// Sets the driver
    pub fn with_driver(mut self, driver_id: UserId) -> Self {
        self.driver_id = driver_id;
        self
    }

    /// Sets the local departure date and time
    pub fn departing(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.departure_date = date;
        self.departure_time = time;
        self
    }

    /// Sets the departure so the trip leaves exactly `hours` hours after
    /// the given reference instant (UTC timezone)
    pub fn departing_hours_after(mut self, now: DateTime<Utc>, hours: i64) -> Self {
        let departs_at = now + Duration::hours(hours);
        self.departure_date = departs_at.date_naive();
        self.departure_time = departs_at.time();
        self.timezone = Timezone::default();
        self
    }

    /// Sets the price per seat
    pub fn with_price_per_seat(mut self, amount: Decimal, currency: Currency) -> Self {
        self.price_per_seat = Money::new(amount, currency);
        self
    }

    /// Builds the trip
    pub fn build(self) -> Trip {
        Trip::new(
            self.driver_id,
            self.origin,
            self.destination,
            self.departure_date,
            self.departure_time,
            self.timezone,
            self.price_per_seat,
            self.seats_total,
        )
    }
}

/// Builder for test bookings
pub struct BookingBuilder {
    trip_id: TripId,
    passenger_id: UserId,
    seats: u32,
    total_price: Money,
    confirmed: bool,
}

impl Default for BookingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingBuilder {
    /// Creates a builder with default values (one seat, EUR 25, pending)
    pub fn new() -> Self {
        Self {
            trip_id: TripId::new(),
            passenger_id: UserId::new(),
            seats: 1,
            total_price: Money::new(dec!(25), Currency::EUR),
            confirmed: false,
        }
    }

    /// Books seats on the given trip
    pub fn on_trip(mut self, trip: &Trip) -> Self {
        self.trip_id = trip.id;
        self
    }

    /// Sets the passenger
    pub fn with_passenger(mut self, passenger_id: UserId) -> Self {
        self.passenger_id = passenger_id;
        self
    }

    /// Sets the total price
    pub fn with_total_price(mut self, amount: Decimal, currency: Currency) -> Self {
        self.total_price = Money::new(amount, currency);
        self
    }

    /// Marks the booking driver-confirmed
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// Builds the booking
    pub fn build(self) -> Booking {
        let mut booking = Booking::new(
            self.trip_id,
            self.passenger_id,
            self.seats,
            self.total_price,
        );
        if self.confirmed {
            booking
                .confirm()
                .expect("fresh booking is always confirmable");
            debug_assert_eq!(booking.status, BookingStatus::Confirmed);
        }
        booking
    }
}
