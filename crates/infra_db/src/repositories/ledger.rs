//! Transaction ledger adapter
//!
//! Transfers are insert-only; there is no update path.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_booking::{TransactionLedger, Transfer};

use crate::error::to_port_error;

/// PostgreSQL implementation of the TransactionLedger port
#[derive(Debug, Clone)]
pub struct PgTransactionLedger {
    pool: PgPool,
}

impl PgTransactionLedger {
    /// Creates a new ledger over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgTransactionLedger {}

#[async_trait]
impl TransactionLedger for PgTransactionLedger {
    async fn record(&self, transfer: Transfer) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO transfers (
                id, booking_id, sender_id, receiver_id,
                amount, currency, status, description,
                created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(transfer.id.as_uuid())
        .bind(transfer.booking_id.as_uuid())
        .bind(transfer.sender_id.as_uuid())
        .bind(transfer.receiver_id.as_uuid())
        .bind(transfer.amount.amount())
        .bind(transfer.amount.currency().code())
        .bind(transfer.status.as_str())
        .bind(&transfer.description)
        .bind(transfer.created_at)
        .bind(transfer.completed_at)
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;

        debug!(transfer_id = %transfer.id, amount = %transfer.amount, "transfer recorded");
        Ok(())
    }
}
