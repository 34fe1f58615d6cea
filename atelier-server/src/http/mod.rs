//! HTTP server layer
//!
//! Axum server with:
//! - Explicit per-route access (public / protected) enforced by `guard`
//! - CORS (localhost only unless permissive)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod guard;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use guard::{Access, Denial, Principal};
pub use server::{build_app, run_server, ServerConfig, ServerError};
