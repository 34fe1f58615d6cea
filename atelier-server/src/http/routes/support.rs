//! Support desk endpoints

use atelier_core::models::SupportTag;
use axum::{extract::State, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::state::AppState;

/// GET /api/support/tags - active tags, name ascending
async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<SupportTag>>, ApiError> {
    let tags = state
        .support()
        .active_tags()
        .await
        .map_err(|e| ApiError::database("Failed to fetch support tags", e))?;

    Ok(Json(tags))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/support/tags", get(list_tags))
}
