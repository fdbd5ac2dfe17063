//! OpenAPI document for the canvas API.

use axum::Router;
use utoipa::OpenApi;

use crate::api::dto::{FocusedCanvasResponse, ImageListResponse, UpdateResponse};
use crate::api::handlers::{canvas, system};
use crate::app_state::AppState;
use crate::domain::{DripId, DripUpdate, Focus, ImageView};
use crate::error::{ErrorBody, ErrorResponse};

/// Path of the generated OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Generated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "drip-canvas", description = "Shared canvas of positioned images"),
    paths(
        canvas::list_images,
        canvas::update_positions,
        canvas::focused_canvas,
        canvas::canvas,
        system::health_handler,
    ),
    components(schemas(
        DripId,
        DripUpdate,
        ImageView,
        Focus,
        ImageListResponse,
        FocusedCanvasResponse,
        UpdateResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Canvas", description = "Image list, position updates, deep links"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document, with Swagger UI when the `swagger-ui`
/// feature is enabled.
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
    )
}

/// Serves the OpenAPI document, with Swagger UI when the `swagger-ui`
/// feature is enabled.
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    use axum::routing::get;

    Router::new().route(
        OPENAPI_PATH,
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}
