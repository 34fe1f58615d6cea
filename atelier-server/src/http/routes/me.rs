//! The caller's own account

use atelier_core::models::MeResponse;
use axum::{extract::State, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::Authenticated;
use crate::state::AppState;

/// GET /api/me - full profile plus subscription, if any
async fn me(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<MeResponse>, ApiError> {
    let subscription = state
        .users()
        .subscription(principal.user_id())
        .await
        .map_err(|e| ApiError::database("Failed to fetch subscription", e))?;

    Ok(Json(MeResponse {
        user: principal.user,
        subscription,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/me", get(me))
}
