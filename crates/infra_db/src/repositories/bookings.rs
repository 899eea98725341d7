//! Booking store adapter
//!
//! PostgreSQL implementation of the `BookingStore` port. Queries are
//! runtime-bound; statuses, currencies, and timezones are stored as text
//! and parsed back through the domain types.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{
    BookingId, Currency, DomainPort, Money, PortError, Timezone, TripId, UserId,
};
use domain_booking::{
    BookedTrip, Booking, BookingStore, PassengerBookingCounts, Trip,
};

use crate::error::to_port_error;

const SELECT_BOOKED_TRIP: &str = r#"
SELECT
    b.id AS booking_id, b.trip_id, b.passenger_id, b.seats,
    b.total_price, b.currency, b.status,
    b.cancelled_at, b.cancelled_by, b.cancellation_reason,
    b.created_at AS booking_created_at, b.updated_at AS booking_updated_at,
    t.driver_id, t.origin, t.destination,
    t.departure_date, t.departure_time, t.timezone,
    t.price_per_seat, t.seats_total, t.created_at AS trip_created_at
FROM bookings b
JOIN trips t ON t.id = b.trip_id
"#;

/// Joined booking + trip row
#[derive(Debug, FromRow)]
struct BookedTripRow {
    booking_id: Uuid,
    trip_id: Uuid,
    passenger_id: Uuid,
    seats: i32,
    total_price: Decimal,
    currency: String,
    status: String,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<Uuid>,
    cancellation_reason: Option<String>,
    booking_created_at: DateTime<Utc>,
    booking_updated_at: DateTime<Utc>,
    driver_id: Uuid,
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    timezone: String,
    price_per_seat: Decimal,
    seats_total: i32,
    trip_created_at: DateTime<Utc>,
}

impl BookedTripRow {
    fn into_domain(self) -> Result<BookedTrip, PortError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: core_kernel::MoneyError| PortError::internal(e.to_string()))?;
        let status = self
            .status
            .parse()
            .map_err(PortError::internal)?;
        let timezone: Timezone = self
            .timezone
            .parse()
            .map_err(|e: String| PortError::internal(format!("Invalid timezone: {}", e)))?;

        let booking = Booking {
            id: BookingId::from(self.booking_id),
            trip_id: TripId::from(self.trip_id),
            passenger_id: UserId::from(self.passenger_id),
            seats: self.seats as u32,
            total_price: Money::new(self.total_price, currency),
            status,
            cancelled_at: self.cancelled_at,
            cancelled_by: self.cancelled_by.map(UserId::from),
            cancellation_reason: self.cancellation_reason,
            created_at: self.booking_created_at,
            updated_at: self.booking_updated_at,
        };
        let trip = Trip {
            id: TripId::from(self.trip_id),
            driver_id: UserId::from(self.driver_id),
            origin: self.origin,
            destination: self.destination,
            departure_date: self.departure_date,
            departure_time: self.departure_time,
            timezone,
            price_per_seat: Money::new(self.price_per_seat, currency),
            seats_total: self.seats_total as u32,
            created_at: self.trip_created_at,
        };

        Ok(BookedTrip { booking, trip })
    }
}

/// PostgreSQL implementation of the BookingStore port
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgBookingStore {}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn booking_with_trip(&self, id: BookingId) -> Result<BookedTrip, PortError> {
        let sql = format!("{} WHERE b.id = $1", SELECT_BOOKED_TRIP);
        let row = sqlx::query_as::<_, BookedTripRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(to_port_error)?
            .ok_or_else(|| PortError::not_found("Booking", id))?;

        row.into_domain()
    }

    async fn mark_cancelled(
        &self,
        id: BookingId,
        cancelled_at: DateTime<Utc>,
        cancelled_by: UserId,
        reason: &str,
    ) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'cancelled', cancelled_at = $2, cancelled_by = $3,
                cancellation_reason = $4, updated_at = $2
            WHERE id = $1 AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(id.as_uuid())
        .bind(cancelled_at)
        .bind(cancelled_by.as_uuid())
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;

        if result.rows_affected() == 0 {
            // Either the booking does not exist or it is no longer in a
            // cancellable status.
            let status: Option<(String,)> =
                sqlx::query_as("SELECT status FROM bookings WHERE id = $1")
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(to_port_error)?;

            return match status {
                None => Err(PortError::not_found("Booking", id)),
                Some((status,)) => Err(PortError::conflict(format!(
                    "booking {} is {} and cannot be cancelled",
                    id, status
                ))),
            };
        }

        debug!(booking_id = %id, "booking marked cancelled");
        Ok(())
    }

    async fn passenger_booking_counts(
        &self,
        passenger_id: UserId,
    ) -> Result<PassengerBookingCounts, PortError> {
        let (total, cancelled): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM bookings
            WHERE passenger_id = $1
            "#,
        )
        .bind(passenger_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(to_port_error)?;

        Ok(PassengerBookingCounts {
            total: total as u64,
            cancelled: cancelled as u64,
        })
    }

    async fn cancellation_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<BookedTrip>, PortError> {
        let sql = format!(
            r#"{}
            WHERE b.status = 'cancelled'
              AND (b.passenger_id = $1 OR b.cancelled_by = $1)
            ORDER BY b.cancelled_at DESC
            LIMIT $2
            "#,
            SELECT_BOOKED_TRIP
        );
        let rows = sqlx::query_as::<_, BookedTripRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(to_port_error)?;

        rows.into_iter().map(BookedTripRow::into_domain).collect()
    }
}
