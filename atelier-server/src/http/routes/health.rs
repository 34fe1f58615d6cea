//! Liveness check
//!
//! Answers without touching any of the four databases, so a slow schema
//! never makes the process look dead.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

const LIVE: Liveness = Liveness {
    status: "ok",
    service: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

/// GET /health
async fn liveness() -> Json<Liveness> {
    Json(LIVE)
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(liveness))
}
