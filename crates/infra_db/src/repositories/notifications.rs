//! Notification outbox adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{DomainPort, PortError};
use domain_booking::{Notification, NotificationOutbox};

use crate::error::to_port_error;

/// PostgreSQL implementation of the NotificationOutbox port
#[derive(Debug, Clone)]
pub struct PgNotificationOutbox {
    pool: PgPool,
}

impl PgNotificationOutbox {
    /// Creates a new outbox over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgNotificationOutbox {}

#[async_trait]
impl NotificationOutbox for PgNotificationOutbox {
    async fn push(&self, notification: Notification) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_id, kind, title, message,
                booking_id, priority, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.recipient_id.as_uuid())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.booking_id.map(Uuid::from))
        .bind(notification.priority.as_str())
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;

        debug!(
            notification_id = %notification.id,
            recipient = %notification.recipient_id,
            "notification queued"
        );
        Ok(())
    }
}
