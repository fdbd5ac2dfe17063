//! Data Transfer Objects for REST request/response serialization.

pub mod canvas_dto;

pub use canvas_dto::*;
