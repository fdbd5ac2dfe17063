//! Focus coordinates parsed from the canvas deep-link path.

use serde::Serialize;
use utoipa::ToSchema;

/// A canvas location the client should center on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Focus {
    /// Horizontal canvas position.
    pub x: f64,
    /// Vertical canvas position.
    pub y: f64,
}

impl Focus {
    /// Parses a `"<x>,<y>"` path segment.
    ///
    /// Returns `None` unless the segment has exactly two comma-separated
    /// components that both parse as finite numbers. Surrounding whitespace
    /// on each component is ignored.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        let mut parts = segment.split(',');
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        Some(Self {
            x: parse_component(x)?,
            y: parse_component(y)?,
        })
    }

    /// Resolves an optional path segment. A missing segment means no focus.
    #[must_use]
    pub fn from_segment(segment: Option<&str>) -> Option<Self> {
        segment.and_then(Self::parse)
    }
}

fn parse_component(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
