//! Notification outbox records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BookingId, NotificationId, UserId};

/// Kind of notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmed,
    BookingCancelled,
}

impl NotificationKind {
    /// Returns the database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::BookingCancelled => "booking_cancelled",
        }
    }
}

/// Delivery priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
}

impl NotificationPriority {
    /// Returns the database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message addressed to one user, delivered out-of-band by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: NotificationId,
    /// Addressee
    pub recipient_id: UserId,
    /// Kind tag
    pub kind: NotificationKind,
    /// Short title
    pub title: String,
    /// Full message
    pub message: String,
    /// Related booking, if any
    pub booking_id: Option<BookingId>,
    /// Delivery priority
    pub priority: NotificationPriority,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a high-priority cancellation notice for the counter-party
    pub fn booking_cancelled(
        recipient_id: UserId,
        booking_id: BookingId,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new_v7(),
            recipient_id,
            kind: NotificationKind::BookingCancelled,
            title: "Booking cancelled".to_string(),
            message: message.into(),
            booking_id: Some(booking_id),
            priority: NotificationPriority::High,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_notice_is_high_priority() {
        let recipient = UserId::new();
        let booking_id = BookingId::new();
        let notice = Notification::booking_cancelled(
            recipient,
            booking_id,
            "Your booking was cancelled by the driver.",
            Utc::now(),
        );

        assert_eq!(notice.priority, NotificationPriority::High);
        assert_eq!(notice.kind, NotificationKind::BookingCancelled);
        assert_eq!(notice.recipient_id, recipient);
        assert_eq!(notice.booking_id, Some(booking_id));
    }
}
