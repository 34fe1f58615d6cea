//! Client-visible configuration

use atelier_core::PublicConfig;
use axum::{extract::State, routing::get, Json, Router};

use crate::state::AppState;

/// GET /api/config/public - `{turnstileSiteKey, umamiWebsiteId}`, nulls when unset
async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.public_config().clone())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/config/public", get(public_config))
}
