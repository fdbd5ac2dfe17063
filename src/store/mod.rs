//! Store layer: access to the remote `drips` table.
//!
//! Provides the [`DripStore`] trait the service layer is written against
//! and three implementations:
//!
//! - [`RestStore`]: hosted PostgREST endpoint (Supabase style) over `reqwest`.
//! - [`PostgresStore`]: direct PostgreSQL access through `sqlx::PgPool`.
//! - [`MemoryStore`]: in-process table for local development and tests.
//!
//! A single store is built at startup by [`build_store`] and shared by all
//! handlers through the application state.

pub mod memory;
pub mod postgres;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{CanvasConfig, StoreBackend};
use crate::domain::{Drip, DripRow, DripUpdate};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use rest::RestStore;

/// Failure reported by a drip store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status.
    #[error("store api error {status}: {message}")]
    Api {
        /// HTTP status returned by the store.
        status: u16,
        /// Response body, as returned.
        message: String,
    },

    /// The store response could not be decoded into rows.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// Database driver failure.
    #[error("database error: {0}")]
    Database(String),

    /// The store refused the write (constraint violation).
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The store is switched off or unreachable.
    #[error("store unavailable")]
    Unavailable,
}

/// Read and upsert access to the `drips` table.
///
/// Implementations make a fresh call to the backing store on every
/// invocation and keep no copy of the rows between calls.
#[async_trait]
pub trait DripStore: Send + Sync + std::fmt::Debug {
    /// Reads `id, url, username, x, y` for every row, in store order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails or rows cannot be decoded.
    async fn select_drips(&self) -> Result<Vec<Drip>, StoreError>;

    /// Reads every column of every row, in store order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails or rows cannot be decoded.
    async fn select_rows(&self) -> Result<Vec<DripRow>, StoreError>;

    /// Inserts or updates every row of `updates`, keyed on `id`.
    ///
    /// Existing rows have only the supplied columns overwritten. Either the
    /// whole batch is applied or the call fails.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store rejects or cannot apply the batch.
    async fn upsert(&self, updates: &[DripUpdate]) -> Result<(), StoreError>;
}

/// Builds the store selected by `config`.
///
/// # Errors
///
/// Returns a [`StoreError`] if the HTTP client cannot be built, the database
/// cannot be reached, or migrations fail.
pub async fn build_store(config: &CanvasConfig) -> Result<Arc<dyn DripStore>, StoreError> {
    match &config.store {
        StoreBackend::Rest { url, anon_key } => {
            let store = RestStore::new(
                url,
                anon_key,
                &config.table,
                Duration::from_secs(config.store_timeout_secs),
            )?;
            tracing::info!(url = %url, table = %config.table, "using hosted rest store");
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres(settings) => {
            let store = PostgresStore::connect(settings, &config.table).await?;
            if settings.run_migrations {
                store.migrate().await?;
            }
            tracing::info!(table = %config.table, "using postgres store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; positions are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
