//! Drip records: stored rows, partial updates, and the page view model.
//!
//! A drip is a single image placed on the shared canvas. [`Drip`] is the
//! fully-populated row returned by projected reads, [`DripUpdate`] is the
//! validated partial row accepted by the position update endpoint, and
//! [`ImageView`] is the shape handed to the page.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An untyped row holding every column the store returned.
///
/// Used by the all-columns read so that columns beyond the five known
/// ones reach the client unchanged.
pub type DripRow = serde_json::Map<String, serde_json::Value>;

/// Primary key of a drip. Sole conflict key for upserts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct DripId(i64);

impl DripId {
    /// Wraps a raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DripId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A fully-populated row of the `drips` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Drip {
    /// Row identifier.
    pub id: DripId,
    /// Location of the image asset.
    pub url: String,
    /// Attribution label.
    pub username: String,
    /// Horizontal canvas position. Unbounded.
    pub x: f64,
    /// Vertical canvas position. Unbounded.
    pub y: f64,
}

/// A partial drip submitted to the position update endpoint.
///
/// Only `id` is required. Absent fields leave the stored column untouched
/// when the row already exists. Unknown fields are rejected at
/// deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DripUpdate {
    /// Row identifier and conflict key.
    pub id: DripId,
    /// New image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// New attribution label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New horizontal position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New vertical position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl DripUpdate {
    /// Creates a position-only update.
    #[must_use]
    pub const fn position(id: DripId, x: f64, y: f64) -> Self {
        Self {
            id,
            url: None,
            username: None,
            x: Some(x),
            y: Some(y),
        }
    }

    /// Names of the columns this update writes, `id` included, in table order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["id"];
        if self.url.is_some() {
            columns.push("url");
        }
        if self.username.is_some() {
            columns.push("username");
        }
        if self.x.is_some() {
            columns.push("x");
        }
        if self.y.is_some() {
            columns.push("y");
        }
        columns
    }

    /// Overwrites the supplied fields of an existing row.
    pub fn merge_into(&self, drip: &mut Drip) {
        if let Some(url) = &self.url {
            drip.url.clone_from(url);
        }
        if let Some(username) = &self.username {
            drip.username.clone_from(username);
        }
        if let Some(x) = self.x {
            drip.x = x;
        }
        if let Some(y) = self.y {
            drip.y = y;
        }
    }
}

/// View model for a single image on the page.
///
/// `name` carries the stored `username`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ImageView {
    /// Row identifier.
    pub id: DripId,
    /// Location of the image asset.
    pub url: String,
    /// Attribution label.
    pub name: String,
    /// Horizontal canvas position.
    pub x: f64,
    /// Vertical canvas position.
    pub y: f64,
}

impl From<Drip> for ImageView {
    fn from(drip: Drip) -> Self {
        Self {
            id: drip.id,
            url: drip.url,
            name: drip.username,
            x: drip.x,
            y: drip.y,
        }
    }
}
