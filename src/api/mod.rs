//! REST API layer: route handlers, DTOs, OpenAPI document, and router
//! composition.
//!
//! The canvas endpoints are mounted at the root so the page paths stay
//! `/` and `/canvas`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::canvas::routes())
        .merge(handlers::system::routes())
        .merge(openapi::routes())
}
