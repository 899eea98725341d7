//! End-to-end cancellation scenarios
//!
//! Exercises the full orchestration against in-memory port mocks: policy
//! tiers, refund and fee transfers, notifications, failure propagation, and
//! the rate/history queries.

use std::sync::Arc;

use chrono::Duration;
use core_kernel::Currency;
use rust_decimal_macros::dec;

use domain_booking::ports::mock::{
    MockBookingStore, MockNotificationOutbox, MockTransactionLedger,
};
use domain_booking::{
    Booking, BookingError, BookingStatus, CancellationService, CancellerRole, FeeTier,
    NotificationPriority, Trip, CANCELLATION_HISTORY_LIMIT,
};
use test_utils::{booking_departing_in, reference_now, BookingBuilder, TripBuilder};

struct Harness {
    store: Arc<MockBookingStore>,
    ledger: Arc<MockTransactionLedger>,
    outbox: Arc<MockNotificationOutbox>,
    service: CancellationService,
}

async fn harness(trip: Trip, bookings: Vec<Booking>) -> Harness {
    let store = Arc::new(MockBookingStore::new().with_trip(trip, bookings).await);
    let ledger = Arc::new(MockTransactionLedger::new());
    let outbox = Arc::new(MockNotificationOutbox::new());
    let service = CancellationService::new(store.clone(), ledger.clone(), outbox.clone());
    Harness {
        store,
        ledger,
        outbox,
        service,
    }
}

mod cancellation_scenarios {
    use super::*;

    /// 48 hours out: free cancellation, full refund, no fee transfer.
    #[tokio::test]
    async fn test_free_cancellation_refunds_everything() {
        let (trip, booking, now) = booking_departing_in(48, dec!(100), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let h = harness(trip, vec![booking]).await;

        let outcome = h
            .service
            .cancel_booking_at(booking_id, passenger, "Change of plans", CancellerRole::Passenger, now)
            .await
            .unwrap();

        assert_eq!(outcome.assessment.tier, FeeTier::Free);
        assert!(outcome.assessment.fee.is_zero());
        assert_eq!(outcome.refund.amount(), dec!(100));

        let transfers = h.ledger.recorded().await;
        assert_eq!(transfers.len(), 1, "only the refund should be recorded");
        assert_eq!(transfers[0].receiver_id, passenger);
        assert_eq!(transfers[0].amount.amount(), dec!(100));
    }

    /// 18 hours out, 200: half goes back to the passenger, half to the
    /// driver as a fee.
    #[tokio::test]
    async fn test_half_fee_splits_the_amount() {
        let (trip, booking, now) = booking_departing_in(18, dec!(200), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let driver = trip.driver_id;
        let h = harness(trip, vec![booking]).await;

        let outcome = h
            .service
            .cancel_booking_at(booking_id, passenger, "Sick", CancellerRole::Passenger, now)
            .await
            .unwrap();

        assert_eq!(outcome.assessment.tier, FeeTier::Half);
        assert_eq!(outcome.assessment.fee.amount(), dec!(100));
        assert_eq!(outcome.refund.amount(), dec!(100));

        let transfers = h.ledger.recorded().await;
        assert_eq!(transfers.len(), 2);
        // Refund first, fee second.
        assert_eq!(transfers[0].receiver_id, passenger);
        assert_eq!(transfers[0].amount.amount(), dec!(100));
        assert_eq!(transfers[1].sender_id, passenger);
        assert_eq!(transfers[1].receiver_id, driver);
        assert_eq!(transfers[1].amount.amount(), dec!(100));
        assert_eq!(transfers[1].description, "Cancellation fee");
    }

    /// 8 hours out, 80: refund 20, fee 60.
    #[tokio::test]
    async fn test_three_quarters_fee() {
        let (trip, booking, now) = booking_departing_in(8, dec!(80), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let h = harness(trip, vec![booking]).await;

        let outcome = h
            .service
            .cancel_booking_at(booking_id, passenger, "Overslept risk", CancellerRole::Passenger, now)
            .await
            .unwrap();

        assert_eq!(outcome.assessment.fee.amount(), dec!(60));
        assert_eq!(outcome.refund.amount(), dec!(20));
        assert_eq!(
            outcome.refund + outcome.assessment.fee,
            core_kernel::Money::new(dec!(80), Currency::EUR)
        );
    }

    /// 3 hours out, 50: nothing comes back, no refund transfer is created.
    #[tokio::test]
    async fn test_full_fee_skips_refund_transfer() {
        let (trip, booking, now) = booking_departing_in(3, dec!(50), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let driver = trip.driver_id;
        let h = harness(trip, vec![booking]).await;

        let outcome = h
            .service
            .cancel_booking_at(booking_id, passenger, "No show", CancellerRole::Passenger, now)
            .await
            .unwrap();

        assert_eq!(outcome.assessment.tier, FeeTier::Full);
        assert!(outcome.refund.is_zero());

        let transfers = h.ledger.recorded().await;
        assert_eq!(transfers.len(), 1, "only the fee should be recorded");
        assert_eq!(transfers[0].receiver_id, driver);
        assert_eq!(transfers[0].amount.amount(), dec!(50));
    }

    /// Trip departed an hour ago: refused, and nothing is written.
    #[tokio::test]
    async fn test_departed_trip_refuses_and_writes_nothing() {
        let (trip, booking, now) = booking_departing_in(-1, dec!(100), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let h = harness(trip, vec![booking]).await;

        let result = h
            .service
            .cancel_booking_at(booking_id, passenger, "Too late", CancellerRole::Passenger, now)
            .await;

        match result {
            Err(BookingError::NotCancellable { reason }) => {
                assert_eq!(reason, "Cannot cancel - trip has already started");
            }
            other => panic!("expected NotCancellable, got {:?}", other.map(|_| ())),
        }

        let current = h.store.booking(booking_id).await.unwrap();
        assert_eq!(current.status, BookingStatus::Confirmed);
        assert!(h.ledger.recorded().await.is_empty());
        assert!(h.outbox.queued().await.is_empty());
    }

    /// Driver cancels: fee flows to the passenger, who is also notified.
    #[tokio::test]
    async fn test_driver_cancellation_pays_the_passenger() {
        let (trip, booking, now) = booking_departing_in(18, dec!(60), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let driver = trip.driver_id;
        let h = harness(trip, vec![booking]).await;

        h.service
            .cancel_booking_at(booking_id, driver, "Car trouble", CancellerRole::Driver, now)
            .await
            .unwrap();

        let transfers = h.ledger.recorded().await;
        let fee = transfers
            .iter()
            .find(|t| t.description == "Cancellation fee")
            .unwrap();
        assert_eq!(fee.sender_id, driver);
        assert_eq!(fee.receiver_id, passenger);

        let notices = h.outbox.queued().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].recipient_id, passenger);
        assert!(notices[0].message.contains("driver"));
    }

    /// Passenger cancels: the driver receives the notification, which
    /// embeds the canceller role and the policy reason.
    #[tokio::test]
    async fn test_notification_goes_to_counter_party() {
        let (trip, booking, now) = booking_departing_in(48, dec!(30), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let driver = trip.driver_id;
        let h = harness(trip, vec![booking]).await;

        h.service
            .cancel_booking_at(booking_id, passenger, "Plans changed", CancellerRole::Passenger, now)
            .await
            .unwrap();

        let notices = h.outbox.queued().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].recipient_id, driver);
        assert_eq!(notices[0].priority, NotificationPriority::High);
        assert!(notices[0].message.contains("passenger"));
        assert!(notices[0].message.contains("Free cancellation"));
        assert_eq!(notices[0].booking_id, Some(booking_id));
    }

    /// The booking is marked cancelled with the caller's metadata.
    #[tokio::test]
    async fn test_cancellation_metadata_is_recorded() {
        let (trip, booking, now) = booking_departing_in(48, dec!(30), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let h = harness(trip, vec![booking]).await;

        h.service
            .cancel_booking_at(booking_id, passenger, "Plans changed", CancellerRole::Passenger, now)
            .await
            .unwrap();

        let current = h.store.booking(booking_id).await.unwrap();
        assert_eq!(current.status, BookingStatus::Cancelled);
        assert_eq!(current.cancelled_at, Some(now));
        assert_eq!(current.cancelled_by, Some(passenger));
        assert_eq!(current.cancellation_reason.as_deref(), Some("Plans changed"));
    }
}

mod error_paths {
    use super::*;
    use core_kernel::BookingId;

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let trip = TripBuilder::new().build();
        let h = harness(trip, vec![]).await;

        let result = h
            .service
            .cancel_booking_at(
                BookingId::new(),
                core_kernel::UserId::new(),
                "whatever",
                CancellerRole::Passenger,
                reference_now(),
            )
            .await;

        assert!(matches!(result, Err(BookingError::BookingNotFound(_))));
    }

    /// A store failure during the status update propagates unchanged and
    /// leaves no transfers or notifications behind.
    #[tokio::test]
    async fn test_store_failure_propagates_without_side_effects() {
        let (trip, booking, now) = booking_departing_in(48, dec!(100), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let h = harness(trip, vec![booking]).await;

        h.store.fail_next_write("connection reset").await;

        let result = h
            .service
            .cancel_booking_at(booking_id, passenger, "Change of plans", CancellerRole::Passenger, now)
            .await;

        assert!(matches!(result, Err(BookingError::Store(_))));
        assert!(h.ledger.recorded().await.is_empty());
        assert!(h.outbox.queued().await.is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_booking_conflicts() {
        let (trip, booking, now) = booking_departing_in(48, dec!(100), Currency::EUR);
        let booking_id = booking.id;
        let passenger = booking.passenger_id;
        let h = harness(trip, vec![booking]).await;

        h.service
            .cancel_booking_at(booking_id, passenger, "first", CancellerRole::Passenger, now)
            .await
            .unwrap();
        let second = h
            .service
            .cancel_booking_at(booking_id, passenger, "second", CancellerRole::Passenger, now)
            .await;

        assert!(matches!(second, Err(BookingError::Store(_))));
    }
}

mod rate_and_history {
    use super::*;

    /// 4 bookings, 1 cancelled: 25%.
    #[tokio::test]
    async fn test_cancellation_rate() {
        let now = reference_now();
        let passenger = core_kernel::UserId::new();
        let trip = TripBuilder::new().departing_hours_after(now, 48).build();

        let mut bookings: Vec<Booking> = (0..4)
            .map(|_| {
                BookingBuilder::new()
                    .on_trip(&trip)
                    .with_passenger(passenger)
                    .confirmed()
                    .build()
            })
            .collect();
        bookings[0]
            .cancel(now, passenger, "changed plans")
            .unwrap();

        let h = harness(trip, bookings).await;

        let rate = h.service.cancellation_rate(passenger).await.unwrap();
        assert_eq!(rate, 25.0);
    }

    #[tokio::test]
    async fn test_cancellation_rate_with_no_bookings_is_zero() {
        let h = harness(TripBuilder::new().build(), vec![]).await;
        let rate = h
            .service
            .cancellation_rate(core_kernel::UserId::new())
            .await
            .unwrap();
        assert_eq!(rate, 0.0);
    }

    /// History returns newest first and caps at the limit.
    #[tokio::test]
    async fn test_cancellation_history_is_ordered_and_capped() {
        let now = reference_now();
        let passenger = core_kernel::UserId::new();
        let trip = TripBuilder::new().departing_hours_after(now, 48).build();

        let mut bookings = Vec::new();
        for i in 0..25i64 {
            let mut booking = BookingBuilder::new()
                .on_trip(&trip)
                .with_passenger(passenger)
                .build();
            booking
                .cancel(now + Duration::minutes(i), passenger, "cleanup")
                .unwrap();
            bookings.push(booking);
        }

        let h = harness(trip, bookings).await;

        let history = h.service.cancellation_history(passenger).await.unwrap();
        assert_eq!(history.len(), CANCELLATION_HISTORY_LIMIT as usize);

        let times: Vec<_> = history
            .iter()
            .map(|entry| entry.booking.cancelled_at.unwrap())
            .collect();
        let mut sorted = times.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(times, sorted, "history must be newest first");
        // The oldest five cancellations fall off the end.
        assert_eq!(times.last().unwrap(), &(now + Duration::minutes(5)));
    }

    /// A driver who cancelled a passenger's booking sees it in their own
    /// history even though they were not the passenger.
    #[tokio::test]
    async fn test_history_includes_cancellations_performed_by_user() {
        let now = reference_now();
        let driver = core_kernel::UserId::new();
        let trip = TripBuilder::new()
            .with_driver(driver)
            .departing_hours_after(now, 48)
            .build();

        let mut booking = BookingBuilder::new().on_trip(&trip).build();
        booking.cancel(now, driver, "trip cancelled").unwrap();

        let h = harness(trip, vec![booking]).await;

        let history = h.service.cancellation_history(driver).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].booking.cancelled_by, Some(driver));
    }
}
