//! Custom Axum extractors: the caller's identity, and JSON/query parsing
//! that rejects with the API's JSON error body

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use super::error::ApiError;
use super::guard::{resolve_principal, Principal};
use crate::state::AppState;

/// Caller of a protected route, placed in extensions by the guard.
///
/// Rejects with 401 on a route that was not protected, so a missing guard
/// fails closed.
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Optional caller on a public route. Bad tokens read as anonymous.
pub struct Viewer(pub Option<Principal>);

impl Viewer {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(Principal::user_id)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Self(Some(principal.clone())));
        }

        Ok(Self(resolve_principal(state, &parts.headers).await?))
    }
}

/// `axum::Json` that rejects malformed bodies with a 400 [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` that rejects malformed query strings with a 400 [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
