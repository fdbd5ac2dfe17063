//! PostgreSQL implementation of the drip store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{DripStore, StoreError};
use crate::config::PostgresSettings;
use crate::domain::{Drip, DripId, DripRow, DripUpdate};

/// PostgreSQL-backed drip store using `sqlx::PgPool`.
///
/// The table name comes from configuration and is validated as a plain
/// identifier before it reaches any statement.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
        }
    }

    /// Opens a connection pool described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database cannot be reached.
    pub async fn connect(settings: &PostgresSettings, table: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .connect(&settings.database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool, table))
    }

    /// Applies the bundled migrations, creating the `drips` table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn upsert_sql(&self) -> String {
        let t = &self.table;
        format!(
            "INSERT INTO {t} (id, url, username, x, y) \
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0)) \
             ON CONFLICT (id) DO UPDATE SET \
             url = COALESCE($2, {t}.url), \
             username = COALESCE($3, {t}.username), \
             x = COALESCE($4, {t}.x), \
             y = COALESCE($5, {t}.y)"
        )
    }
}

#[async_trait]
impl DripStore for PostgresStore {
    async fn select_drips(&self) -> Result<Vec<Drip>, StoreError> {
        let sql = format!("SELECT id, url, username, x, y FROM {}", self.table);
        let rows = sqlx::query_as::<_, (i64, String, String, f64, f64)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, url, username, x, y)| Drip {
                id: DripId::new(id),
                url,
                username,
                x,
                y,
            })
            .collect())
    }

    async fn select_rows(&self) -> Result<Vec<DripRow>, StoreError> {
        let sql = format!("SELECT to_jsonb(d) FROM {} d", self.table);
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter()
            .map(|value| match value {
                serde_json::Value::Object(row) => Ok(row),
                other => Err(StoreError::Decode(format!("row is not an object: {other}"))),
            })
            .collect()
    }

    async fn upsert(&self, updates: &[DripUpdate]) -> Result<(), StoreError> {
        let sql = self.upsert_sql();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for update in updates {
            sqlx::query(&sql)
                .bind(update.id.get())
                .bind(update.url.as_deref())
                .bind(update.username.as_deref())
                .bind(update.x)
                .bind(update.y)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)
    }
}

/// Constraint violations surface as [`StoreError::Rejected`]; everything
/// else is a driver failure.
fn db_error(e: sqlx::Error) -> StoreError {
    match e.as_database_error() {
        Some(db) => StoreError::Rejected(db.message().to_string()),
        None => StoreError::Database(e.to_string()),
    }
}
