//! Canvas handlers: image list, position updates, coordinate deep links.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    FocusedCanvasResponse, ImageListResponse, STORE_UNAVAILABLE, UpdateResponse,
};
use crate::app_state::AppState;
use crate::domain::DripUpdate;
use crate::error::{CanvasError, ErrorResponse};

/// `GET /` — Image list for the canvas page.
///
/// A store failure is logged and answered with an empty list plus an
/// `error` reason, so the page still renders.
#[utoipa::path(
    get,
    path = "/",
    tag = "Canvas",
    summary = "List images",
    description = "Returns every drip as `{id, url, name, x, y}` in store order. On store failure the list is empty and `error` is set.",
    responses(
        (status = 200, description = "Image list", body = ImageListResponse),
    )
)]
pub async fn list_images(State(state): State<AppState>) -> Json<ImageListResponse> {
    match state.canvas_service.list_images().await {
        Ok(images) => Json(ImageListResponse {
            images,
            error: None,
        }),
        Err(e) => {
            tracing::error!(error = %e, "error fetching data from drips table");
            Json(ImageListResponse {
                images: Vec::new(),
                error: Some(STORE_UNAVAILABLE.to_string()),
            })
        }
    }
}

/// `POST /canvas` — Upsert a batch of drip positions keyed by `id`.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidRequest`] when the body is not a valid
/// batch. Store failures are answered with `500 {"success": false}`.
///
/// The body is parsed as JSON whatever its `Content-Type`, since browser
/// `fetch` calls without headers send `text/plain`.
#[utoipa::path(
    post,
    path = "/canvas",
    tag = "Canvas",
    summary = "Update positions",
    description = "Upserts every object of the batch keyed by `id`. Only supplied fields change on existing rows. Every object must carry the same set of fields. The batch is applied whole or not at all.",
    request_body = Vec<DripUpdate>,
    responses(
        (status = 200, description = "Batch applied", body = UpdateResponse),
        (status = 400, description = "Malformed batch, repeated id, or mixed field sets", body = ErrorResponse),
        (status = 500, description = "Store rejected the batch", body = UpdateResponse),
    )
)]
pub async fn update_positions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, CanvasError> {
    let updates = serde_json::from_slice::<Vec<DripUpdate>>(&body)
        .map_err(|e| CanvasError::InvalidRequest(e.to_string()))?;

    match state.canvas_service.update_positions(&updates).await {
        Ok(_) => Ok((StatusCode::OK, Json(UpdateResponse { success: true }))),
        Err(CanvasError::Store(e)) => {
            tracing::error!(error = %e, rows = updates.len(), "error updating positions");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UpdateResponse { success: false }),
            ))
        }
        Err(e) => Err(e),
    }
}

/// `GET /canvas/{coords}` — All rows plus a focus parsed from `"<x>,<y>"`.
#[utoipa::path(
    get,
    path = "/canvas/{coords}",
    tag = "Canvas",
    summary = "Load canvas focused on a coordinate",
    description = "Returns every row with all columns. `focus` is set when `coords` has exactly two numeric components, otherwise `null`.",
    params(
        ("coords" = String, Path, description = "Comma-separated `x,y` pair"),
    ),
    responses(
        (status = 200, description = "Canvas rows and focus", body = FocusedCanvasResponse),
    )
)]
pub async fn focused_canvas(
    State(state): State<AppState>,
    Path(coords): Path<String>,
) -> Json<FocusedCanvasResponse> {
    load_canvas(&state, Some(&coords)).await
}

/// `GET /canvas/` — Empty coordinate segment, so no focus.
pub async fn empty_coords_canvas(State(state): State<AppState>) -> Json<FocusedCanvasResponse> {
    load_canvas(&state, Some("")).await
}

/// `GET /canvas` — All rows without a focus.
#[utoipa::path(
    get,
    path = "/canvas",
    tag = "Canvas",
    summary = "Load canvas",
    description = "Same as `/canvas/{coords}` with no coordinate segment; `focus` is always `null`.",
    responses(
        (status = 200, description = "Canvas rows", body = FocusedCanvasResponse),
    )
)]
pub async fn canvas(State(state): State<AppState>) -> Json<FocusedCanvasResponse> {
    load_canvas(&state, None).await
}

async fn load_canvas(state: &AppState, coords: Option<&str>) -> Json<FocusedCanvasResponse> {
    let loaded = state.canvas_service.load_focused(coords).await;
    let (images, error) = match loaded.images {
        Ok(rows) => (rows, None),
        Err(e) => {
            tracing::error!(error = %e, "error fetching canvas rows");
            (Vec::new(), Some(STORE_UNAVAILABLE.to_string()))
        }
    };
    Json(FocusedCanvasResponse {
        images,
        focus: loaded.focus,
        error,
    })
}

/// Canvas routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_images))
        .route("/canvas", get(canvas).post(update_positions))
        .route("/canvas/", get(empty_coords_canvas))
        .route("/canvas/{coords}", get(focused_canvas))
}
