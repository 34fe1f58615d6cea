//! Database layer - one pool per schema, repositories behind store traits
//!
//! # Design Principles
//!
//! - Each schema gets its own pool, built once at start-up and injected
//! - No query ever joins across schemas; composition happens in `crate::compose`
//! - Store traits are the seam between handlers and Postgres, so routes can
//!   run against `memory::InMemoryStore` in tests

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, Databases};
pub use repos::*;
