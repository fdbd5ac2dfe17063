//! Domain layer: drip records and canvas focus coordinates.

pub mod drip;
pub mod focus;

pub use drip::{Drip, DripId, DripRow, DripUpdate, ImageView};
pub use focus::Focus;
