//! In-process drip table.
//!
//! Mirrors the column semantics of the hosted table: `url` and `username`
//! are NOT NULL, `x` and `y` default to `0`. Rows keep insertion order.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DripStore, StoreError};
use crate::domain::{Drip, DripRow, DripUpdate};

/// In-memory [`DripStore`] guarded by a single [`RwLock`].
///
/// A batch upsert is applied to a copy of the table and swapped in only
/// when every row succeeds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Drip>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `drips`.
    #[must_use]
    pub fn with_drips(drips: Vec<Drip>) -> Self {
        Self {
            rows: RwLock::new(drips),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns a copy of the current table.
    pub async fn snapshot(&self) -> Vec<Drip> {
        self.rows.read().await.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DripStore for MemoryStore {
    async fn select_drips(&self) -> Result<Vec<Drip>, StoreError> {
        self.check_available()?;
        Ok(self.snapshot().await)
    }

    async fn select_rows(&self) -> Result<Vec<DripRow>, StoreError> {
        self.check_available()?;
        self.rows
            .read()
            .await
            .iter()
            .map(|drip| match serde_json::to_value(drip) {
                Ok(serde_json::Value::Object(row)) => Ok(row),
                Ok(other) => Err(StoreError::Decode(format!("row is not an object: {other}"))),
                Err(e) => Err(StoreError::Decode(e.to_string())),
            })
            .collect()
    }

    async fn upsert(&self, updates: &[DripUpdate]) -> Result<(), StoreError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let mut next = rows.clone();
        for update in updates {
            match next.iter_mut().find(|drip| drip.id == update.id) {
                Some(existing) => update.merge_into(existing),
                None => next.push(insert_row(update)?),
            }
        }
        *rows = next;
        Ok(())
    }
}

fn insert_row(update: &DripUpdate) -> Result<Drip, StoreError> {
    let (Some(url), Some(username)) = (&update.url, &update.username) else {
        return Err(StoreError::Rejected(format!(
            "new drip {} requires url and username",
            update.id
        )));
    };
    Ok(Drip {
        id: update.id,
        url: url.clone(),
        username: username.clone(),
        x: update.x.unwrap_or_default(),
        y: update.y.unwrap_or_default(),
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::domain::DripId;

    fn drip(id: i64, x: f64, y: f64) -> Drip {
        Drip {
            id: DripId::new(id),
            url: format!("https://cdn.example/{id}.png"),
            username: format!("user{id}"),
            x,
            y,
        }
    }

    fn seeded() -> MemoryStore {
        MemoryStore::with_drips(vec![drip(1, 0.0, 0.0), drip(2, 5.0, 5.0), drip(3, -1.0, 9.0)])
    }

    #[tokio::test]
    async fn upsert_existing_overwrites_supplied_columns() {
        let store = seeded();
        assert_ok!(
            store
                .upsert(&[DripUpdate::position(DripId::new(2), 10.0, 20.0)])
                .await
        );

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 3);
        let Some(row) = rows.iter().find(|d| d.id == DripId::new(2)) else {
            panic!("row 2 missing");
        };
        assert_eq!((row.x, row.y), (10.0, 20.0));
        assert_eq!(row.url, "https://cdn.example/2.png");
        assert_eq!(row.username, "user2");
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = seeded();
        let update = [DripUpdate::position(DripId::new(1), 3.0, 4.0)];
        assert_ok!(store.upsert(&update).await);
        let once = store.snapshot().await;
        assert_ok!(store.upsert(&update).await);
        assert_eq!(store.snapshot().await, once);
    }

    #[tokio::test]
    async fn upsert_new_id_inserts() {
        let store = seeded();
        let update = DripUpdate {
            id: DripId::new(9),
            url: Some("https://cdn.example/9.png".to_string()),
            username: Some("newcomer".to_string()),
            x: Some(-500.0),
            y: None,
        };
        assert!(store.upsert(&[update]).await.is_ok());

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 4);
        let Some(last) = rows.last() else {
            panic!("empty table");
        };
        assert_eq!(last.id, DripId::new(9));
        assert_eq!((last.x, last.y), (-500.0, 0.0));
    }

    #[tokio::test]
    async fn failed_row_rolls_back_batch() {
        let store = seeded();
        let batch = [
            DripUpdate::position(DripId::new(1), 100.0, 100.0),
            DripUpdate::position(DripId::new(42), 1.0, 1.0),
        ];
        let result = store.upsert(&batch).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.first().map(|d| d.x), Some(0.0));
    }

    #[tokio::test]
    async fn select_rows_exposes_all_columns() {
        let store = seeded();
        let Ok(rows) = store.select_rows().await else {
            panic!("select failed");
        };
        assert_eq!(rows.len(), 3);
        let Some(first) = rows.first() else {
            panic!("no rows");
        };
        assert_eq!(first.get("username"), Some(&serde_json::json!("user1")));
        assert_eq!(first.get("id"), Some(&serde_json::json!(1)));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = seeded();
        store.set_unavailable(true);
        assert!(matches!(
            store.select_drips().await,
            Err(StoreError::Unavailable)
        ));
        assert_err!(store.select_rows().await);
        assert_err!(store.upsert(&[]).await);

        store.set_unavailable(false);
        assert_ok!(store.select_drips().await);
    }
}
