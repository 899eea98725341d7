//! Booking domain ports
//!
//! Port traits for everything the cancellation engine needs from the
//! outside world: the booking store, the transaction ledger, and the
//! notification outbox. Adapters implement these traits; the Postgres
//! implementations live in `infra_db`, and in-memory mocks are provided
//! here for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{BookingId, DomainPort, PortError, UserId};

use crate::booking::Booking;
use crate::notification::Notification;
use crate::transaction::Transfer;
use crate::trip::Trip;

/// A booking joined with its trip, as returned by fetch and history queries
#[derive(Debug, Clone)]
pub struct BookedTrip {
    pub booking: Booking,
    pub trip: Trip,
}

/// Per-passenger booking counts used for the cancellation rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassengerBookingCounts {
    /// All bookings ever made by the passenger
    pub total: u64,
    /// Bookings currently in cancelled status
    pub cancelled: u64,
}

/// Read/write interface to the booking store
#[async_trait]
pub trait BookingStore: DomainPort {
    /// Fetches a booking joined with its trip
    ///
    /// # Returns
    ///
    /// The booking and trip, or `PortError::NotFound`
    async fn booking_with_trip(&self, id: BookingId) -> Result<BookedTrip, PortError>;

    /// Transitions a booking to cancelled, recording when, by whom, and why
    ///
    /// Adapters surface a second cancellation of the same booking as
    /// `PortError::Conflict`.
    async fn mark_cancelled(
        &self,
        id: BookingId,
        cancelled_at: DateTime<Utc>,
        cancelled_by: UserId,
        reason: &str,
    ) -> Result<(), PortError>;

    /// Counts a passenger's bookings, total and cancelled
    async fn passenger_booking_counts(
        &self,
        passenger_id: UserId,
    ) -> Result<PassengerBookingCounts, PortError>;

    /// Most recent cancelled bookings where the user was the passenger or
    /// performed the cancellation, newest first, at most `limit`
    async fn cancellation_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<BookedTrip>, PortError>;
}

/// Write interface to the transaction ledger
#[async_trait]
pub trait TransactionLedger: DomainPort {
    /// Records an immutable transfer
    async fn record(&self, transfer: Transfer) -> Result<(), PortError>;
}

/// Write interface to the notification outbox
#[async_trait]
pub trait NotificationOutbox: DomainPort {
    /// Queues a notification for delivery
    async fn push(&self, notification: Notification) -> Result<(), PortError>;
}

/// In-memory mock adapters for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::TripId;

    use crate::booking::BookingStatus;
    use crate::error::BookingError;

    /// In-memory mock implementation of BookingStore
    #[derive(Debug, Default)]
    pub struct MockBookingStore {
        bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
        trips: Arc<RwLock<HashMap<TripId, Trip>>>,
        /// When set, the next write fails with this message
        fail_next_write: Arc<RwLock<Option<String>>>,
    }

    impl MockBookingStore {
        /// Creates a new mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with a trip and its bookings
        pub async fn with_trip(self, trip: Trip, bookings: Vec<Booking>) -> Self {
            self.trips.write().await.insert(trip.id, trip);
            for booking in bookings {
                self.bookings.write().await.insert(booking.id, booking);
            }
            self
        }

        /// Makes the next `mark_cancelled` fail, to exercise persistence
        /// error paths
        pub async fn fail_next_write(&self, message: impl Into<String>) {
            *self.fail_next_write.write().await = Some(message.into());
        }

        /// Returns the current state of a booking
        pub async fn booking(&self, id: BookingId) -> Option<Booking> {
            self.bookings.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for MockBookingStore {}

    #[async_trait]
    impl BookingStore for MockBookingStore {
        async fn booking_with_trip(&self, id: BookingId) -> Result<BookedTrip, PortError> {
            let booking = self
                .bookings
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Booking", id))?;
            let trip = self
                .trips
                .read()
                .await
                .get(&booking.trip_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Trip", booking.trip_id))?;
            Ok(BookedTrip { booking, trip })
        }

        async fn mark_cancelled(
            &self,
            id: BookingId,
            cancelled_at: DateTime<Utc>,
            cancelled_by: UserId,
            reason: &str,
        ) -> Result<(), PortError> {
            if let Some(message) = self.fail_next_write.write().await.take() {
                return Err(PortError::connection(message));
            }

            let mut bookings = self.bookings.write().await;
            let booking = bookings
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Booking", id))?;

            booking
                .cancel(cancelled_at, cancelled_by, reason)
                .map_err(|e| match e {
                    BookingError::InvalidStatusTransition { .. } => PortError::conflict(e.to_string()),
                    other => PortError::internal(other.to_string()),
                })
        }

        async fn passenger_booking_counts(
            &self,
            passenger_id: UserId,
        ) -> Result<PassengerBookingCounts, PortError> {
            let bookings = self.bookings.read().await;
            let mut counts = PassengerBookingCounts::default();
            for booking in bookings.values() {
                if booking.passenger_id == passenger_id {
                    counts.total += 1;
                    if booking.status == BookingStatus::Cancelled {
                        counts.cancelled += 1;
                    }
                }
            }
            Ok(counts)
        }

        async fn cancellation_history(
            &self,
            user_id: UserId,
            limit: u32,
        ) -> Result<Vec<BookedTrip>, PortError> {
            let bookings = self.bookings.read().await;
            let trips = self.trips.read().await;

            let mut cancelled: Vec<&Booking> = bookings
                .values()
                .filter(|b| {
                    b.status == BookingStatus::Cancelled
                        && (b.passenger_id == user_id || b.cancelled_by == Some(user_id))
                })
                .collect();
            cancelled.sort_by(|a, b| b.cancelled_at.cmp(&a.cancelled_at));
            cancelled.truncate(limit as usize);

            cancelled
                .into_iter()
                .map(|booking| {
                    trips
                        .get(&booking.trip_id)
                        .cloned()
                        .map(|trip| BookedTrip {
                            booking: booking.clone(),
                            trip,
                        })
                        .ok_or_else(|| PortError::not_found("Trip", booking.trip_id))
                })
                .collect()
        }
    }

    /// In-memory mock implementation of TransactionLedger
    #[derive(Debug, Default)]
    pub struct MockTransactionLedger {
        transfers: Arc<RwLock<Vec<Transfer>>>,
    }

    impl MockTransactionLedger {
        /// Creates a new mock ledger
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns all recorded transfers in insertion order
        pub async fn recorded(&self) -> Vec<Transfer> {
            self.transfers.read().await.clone()
        }
    }

    impl DomainPort for MockTransactionLedger {}

    #[async_trait]
    impl TransactionLedger for MockTransactionLedger {
        async fn record(&self, transfer: Transfer) -> Result<(), PortError> {
            self.transfers.write().await.push(transfer);
            Ok(())
        }
    }

    /// In-memory mock implementation of NotificationOutbox
    #[derive(Debug, Default)]
    pub struct MockNotificationOutbox {
        notifications: Arc<RwLock<Vec<Notification>>>,
    }

    impl MockNotificationOutbox {
        /// Creates a new mock outbox
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns all queued notifications in insertion order
        pub async fn queued(&self) -> Vec<Notification> {
            self.notifications.read().await.clone()
        }
    }

    impl DomainPort for MockNotificationOutbox {}

    #[async_trait]
    impl NotificationOutbox for MockNotificationOutbox {
        async fn push(&self, notification: Notification) -> Result<(), PortError> {
            self.notifications.write().await.push(notification);
            Ok(())
        }
    }
}
