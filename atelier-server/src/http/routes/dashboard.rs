//! Dashboard page data
//!
//! Lives under a page route, so an anonymous request is redirected to the
//! login page rather than answered with 401.

use atelier_core::models::{Plan, PublicProfile};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::Authenticated;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user: PublicProfile,
    pub plan: Plan,
    pub blueprint_count: usize,
}

/// GET /dashboard
async fn dashboard(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<DashboardSummary>, ApiError> {
    let user_id = principal.user_id().to_string();

    let subscription = state
        .users()
        .subscription(&user_id)
        .await
        .map_err(|e| ApiError::database("Failed to load dashboard", e))?;

    let blueprints = state
        .app()
        .list_by_owner(&user_id)
        .await
        .map_err(|e| ApiError::database("Failed to load dashboard", e))?;

    Ok(Json(DashboardSummary {
        user: PublicProfile::from(principal.user),
        // No subscription row means the free plan
        plan: subscription.map_or(Plan::Free, |s| s.plan),
        blueprint_count: blueprints.len(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}
