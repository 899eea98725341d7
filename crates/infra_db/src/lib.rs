//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the booking domain ports, built on SQLx with
//! runtime-bound queries. The domain layer only sees the port traits; this
//! crate is wired in at application startup:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_booking::CancellationService;
//! use infra_db::{create_pool, DatabaseConfig, PgBookingStore, PgNotificationOutbox, PgTransactionLedger};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/openride")).await?;
//! let service = CancellationService::new(
//!     Arc::new(PgBookingStore::new(pool.clone())),
//!     Arc::new(PgTransactionLedger::new(pool.clone())),
//!     Arc::new(PgNotificationOutbox::new(pool)),
//! );
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use repositories::{PgBookingStore, PgNotificationOutbox, PgTransactionLedger};
