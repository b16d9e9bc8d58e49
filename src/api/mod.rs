//! HTTP API
//!
//! Route definitions and request/response types.

pub mod routes;

pub use routes::{create_router, AppState};
