//! Canvas service: page data loaders and the position update path.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{DripRow, DripUpdate, Focus, ImageView};
use crate::error::CanvasError;
use crate::store::{DripStore, StoreError};

/// Result of the coordinate-focused load.
///
/// The focus is always resolved; the rows carry the store outcome so the
/// caller can tell an empty canvas from an unreachable backend.
#[derive(Debug)]
pub struct FocusedCanvas {
    /// Every column of every row, or the read failure.
    pub images: Result<Vec<DripRow>, StoreError>,
    /// Parsed focus coordinate, if the path carried a valid one.
    pub focus: Option<Focus>,
}

/// Orchestration layer over a [`DripStore`].
///
/// Holds no state besides the injected store; every call goes to the store.
#[derive(Debug, Clone)]
pub struct CanvasService {
    store: Arc<dyn DripStore>,
}

impl CanvasService {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DripStore>) -> Self {
        Self { store }
    }

    /// Loads the projected image list, `username` exposed as `name`.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] from the read unchanged.
    pub async fn list_images(&self) -> Result<Vec<ImageView>, StoreError> {
        let drips = self.store.select_drips().await?;
        Ok(drips.into_iter().map(ImageView::from).collect())
    }

    /// Loads every row and resolves the focus coordinate from `coords`.
    pub async fn load_focused(&self, coords: Option<&str>) -> FocusedCanvas {
        let focus = Focus::from_segment(coords);
        let images = self.store.select_rows().await;
        FocusedCanvas { images, focus }
    }

    /// Validates a batch of partial drips and upserts it in one store call.
    ///
    /// Returns the number of rows submitted. An empty batch succeeds without
    /// touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidRequest`] if the batch repeats an id or
    /// mixes field sets, or [`CanvasError::Store`] if the store rejects the
    /// batch.
    pub async fn update_positions(&self, updates: &[DripUpdate]) -> Result<usize, CanvasError> {
        validate_batch(updates)?;
        if updates.is_empty() {
            return Ok(0);
        }
        self.store.upsert(updates).await?;
        tracing::debug!(rows = updates.len(), "positions upserted");
        Ok(updates.len())
    }
}

/// An upsert cannot touch the same row twice in one statement, and a bulk
/// upsert must write the same columns on every row to stay a single call.
fn validate_batch(updates: &[DripUpdate]) -> Result<(), CanvasError> {
    let mut seen = HashSet::with_capacity(updates.len());
    let expected = updates.first().map(DripUpdate::columns);
    for update in updates {
        if let Some(expected) = &expected
            && update.columns() != *expected
        {
            return Err(CanvasError::InvalidRequest(format!(
                "drip {} sets [{}] but the batch sets [{}]",
                update.id,
                update.columns().join(", "),
                expected.join(", ")
            )));
        }
        if !seen.insert(update.id) {
            return Err(CanvasError::InvalidRequest(format!(
                "duplicate id {} in batch",
                update.id
            )));
        }
    }
    Ok(())
}
