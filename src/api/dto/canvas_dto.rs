//! Canvas page DTOs: image list, focused canvas, and update outcome.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DripRow, Focus, ImageView};

/// Reason sent alongside an empty image list when the store failed.
pub const STORE_UNAVAILABLE: &str = "image store unavailable";

/// Response body for `GET /`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageListResponse {
    /// Images in store order.
    pub images: Vec<ImageView>,
    /// Present only when the store read failed and `images` is empty because of it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for `GET /canvas/{coords}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FocusedCanvasResponse {
    /// Full rows, every column the store returned.
    #[schema(value_type = Vec<Object>)]
    pub images: Vec<DripRow>,
    /// Focus coordinate, `null` when the path carried none.
    pub focus: Option<Focus>,
    /// Present only when the store read failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for `POST /canvas`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResponse {
    /// Whether the store accepted the whole batch.
    pub success: bool,
}
