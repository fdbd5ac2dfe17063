//! # drip-canvas
//!
//! HTTP service behind a shared canvas of user-submitted images
//! ("drips"). It lists the images, upserts their positions, and resolves
//! coordinate deep links. All state lives in a single remote `drips`
//! table; this service is glue between HTTP and that table.
//!
//! ## Architecture
//!
//! ```text
//! Browser
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── CanvasService (service/)
//!     │
//!     ├── DripStore (store/)
//!     │     ├── RestStore ── hosted PostgREST table
//!     │     ├── PostgresStore ── PostgreSQL
//!     │     └── MemoryStore
//!     │
//!     └── drips table
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
