//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::CanvasService;
use crate::store::DripStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canvas service for all loaders and updates.
    pub canvas_service: Arc<CanvasService>,
}

impl AppState {
    /// Builds the state around a store created once at startup.
    #[must_use]
    pub fn new(store: Arc<dyn DripStore>) -> Self {
        Self {
            canvas_service: Arc::new(CanvasService::new(store)),
        }
    }
}
