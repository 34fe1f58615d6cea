//! atelier-server: HTTP API over the app, blog, support and users schemas
//!
//! Each schema lives in its own database and is reached only through its
//! own store (see [`db`]). Responses that need data from more than one
//! schema are assembled in [`compose`]. Stores are built once at start-up
//! and handed to handlers through [`state::AppState`].

pub mod compose;
pub mod db;
pub mod http;
pub mod state;

pub use db::{Databases, DbError};
pub use http::{build_app, run_server, ServerConfig, ServerError};
pub use state::{AppState, Stores};
