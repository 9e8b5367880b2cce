//! ODS Admin API
//!
//! HTTP surface for bulk load uploads, bulk load credentials and learning
//! standards sync against ODS instances. The binary in `main.rs` wires the
//! Postgres-backed state; tests build the same router over in-memory state.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use setup::routes::setup_routes;
pub use state::AppState;
