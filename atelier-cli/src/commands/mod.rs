//! Command implementations for the atelier CLI

pub mod auth;
pub mod migrate;
pub mod serve;

pub use auth::{run_login, run_logout, run_whoami};
pub use migrate::run_migrate;
pub use serve::run_serve;
