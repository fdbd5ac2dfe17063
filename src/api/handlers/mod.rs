//! REST endpoint handlers organized by resource.

pub mod canvas;
pub mod system;
