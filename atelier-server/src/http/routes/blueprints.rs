//! Blueprint endpoints

use atelier_core::models::{
    Blueprint, BlueprintDraft, BlueprintFilter, BlueprintWithOwner, PublicProfile, Tier,
    Visibility,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::compose::{blueprints_with_owners, create_blueprint_checked};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, Authenticated, Viewer};
use crate::state::AppState;

/// Query parameters for the public listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub tier: Option<String>,
    pub kind: Option<String>,
}

impl TryFrom<ListParams> for BlueprintFilter {
    type Error = ApiError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let tier = params
            .tier
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::parse::<Tier>)
            .transpose()?;
        let kind = params.kind.filter(|k| !k.is_empty());

        Ok(Self { tier, kind })
    }
}

/// Create blueprint request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlueprintRequest {
    pub title: String,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub tier: Option<Tier>,
    pub kind: String,
}

/// GET /api/blueprints - public blueprints with owners
async fn list_public(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<BlueprintWithOwner>>, ApiError> {
    let filter = BlueprintFilter::try_from(params)?;

    let blueprints = state
        .app()
        .list_public(&filter)
        .await
        .map_err(|e| ApiError::database("Failed to fetch blueprints", e))?;

    let joined = blueprints_with_owners(state.users(), blueprints)
        .await
        .map_err(|e| ApiError::database("Failed to fetch blueprint owners", e))?;

    Ok(Json(joined))
}

/// GET /blueprints/{id} - one blueprint; private ones only for their owner
async fn get_blueprint(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<BlueprintWithOwner>, ApiError> {
    let not_found = || ApiError::NotFound {
        resource: "blueprint",
        id: id.clone(),
    };

    let blueprint = state
        .app()
        .get(&id)
        .await
        .map_err(|e| ApiError::database("Failed to fetch blueprint", e))?
        .ok_or_else(not_found)?;

    // Hidden blueprints look exactly like missing ones
    if !blueprint.is_visible_to(viewer.user_id()) {
        return Err(not_found());
    }

    let mut joined = blueprints_with_owners(state.users(), vec![blueprint])
        .await
        .map_err(|e| ApiError::database("Failed to fetch blueprint owner", e))?;

    joined.pop().map(Json).ok_or_else(not_found)
}

/// POST /api/blueprints - create a blueprint owned by the caller
async fn create_blueprint(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiJson(req): ApiJson<CreateBlueprintRequest>,
) -> Result<(StatusCode, Json<BlueprintWithOwner>), ApiError> {
    let draft = BlueprintDraft::new(
        &req.title,
        req.description.as_deref(),
        req.visibility.unwrap_or(Visibility::Private),
        req.tier.unwrap_or(Tier::Free),
        &req.kind,
    )?;

    let blueprint =
        create_blueprint_checked(state.app(), state.users(), principal.user_id(), &draft).await?;

    tracing::info!(blueprint_id = %blueprint.id, owner_id = %principal.user_id(), "blueprint created");

    Ok((
        StatusCode::CREATED,
        Json(BlueprintWithOwner {
            blueprint,
            owner: Some(PublicProfile::from(principal.user)),
        }),
    ))
}

/// GET /api/me/blueprints - every blueprint the caller owns
async fn list_mine(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<Vec<Blueprint>>, ApiError> {
    let blueprints = state
        .app()
        .list_by_owner(principal.user_id())
        .await
        .map_err(|e| ApiError::database("Failed to fetch blueprints", e))?;

    Ok(Json(blueprints))
}

/// Routes readable without a session
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/blueprints", get(list_public))
        .route("/blueprints/{id}", get(get_blueprint))
}

/// Routes requiring a session
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/api/blueprints", post(create_blueprint))
        .route("/api/me/blueprints", get(list_mine))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_parse_tier() {
        let filter = BlueprintFilter::try_from(ListParams {
            tier: Some("pro".into()),
            kind: Some(String::new()),
        })
        .unwrap();
        assert_eq!(filter.tier, Some(Tier::Pro));
        assert_eq!(filter.kind, None);
    }

    #[test]
    fn list_params_reject_unknown_tier() {
        let err = BlueprintFilter::try_from(ListParams {
            tier: Some("platinum".into()),
            kind: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
