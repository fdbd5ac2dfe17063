//! Service layer: request orchestration over the drip store.
//!
//! [`CanvasService`] implements the three canvas operations against an
//! injected [`crate::store::DripStore`].

pub mod canvas_service;

pub use canvas_service::{CanvasService, FocusedCanvas};
