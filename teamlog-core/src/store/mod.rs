//! Record Store — durable call log rows keyed by `(session_id, member_id)`.
//!
//! Provides a `RecordStore` trait with two backends:
//! - **postgres** — the `"Team_Logs"` table via sqlx, pool built lazily
//! - **memory** — in-process rows for local runs and tests

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::error::TeamLogError;
use crate::models::{CallLogRecord, NewCallLog};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Persistence contract shared by every backend. Each method is a single
/// autocommitted operation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new row and return it with the store-assigned timestamps.
    /// Fails with [`TeamLogError::Duplicate`] if the pair already exists.
    async fn insert(&self, log: NewCallLog) -> Result<CallLogRecord, TeamLogError>;

    /// All rows for a team, newest `date` first.
    async fn list_by_team(&self, team_id: &str) -> Result<Vec<CallLogRecord>, TeamLogError>;

    /// Set `manager_feedback` and advance `updated_at`. `Ok(None)` when no row matches.
    async fn update_feedback(
        &self,
        member_id: &str,
        session_id: &str,
        manager_feedback: &str,
    ) -> Result<Option<CallLogRecord>, TeamLogError>;

    /// Backend version / status string for health reporting.
    async fn health(&self) -> Result<String, TeamLogError>;

    /// Backend name for logging.
    fn backend(&self) -> &str;

    /// Release backend resources. Called once during shutdown.
    async fn close(&self) {}
}

/// Open the backend selected by `database.url`.
///
/// `memory://` selects the in-process store; anything else is treated as a
/// PostgreSQL connection string. No connection is made here.
pub fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, TeamLogError> {
    if config.is_memory() {
        tracing::warn!("Using in-memory record store; call logs will not survive a restart");
        return Ok(Arc::new(MemoryRecordStore::new()));
    }

    let pool = crate::db::create_lazy_pool(config)?;
    Ok(Arc::new(PgRecordStore::new(pool, config.bootstrap_schema)))
}
