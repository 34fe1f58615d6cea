//! Route access guard
//!
//! Every route group declares an [`Access`]. Protected groups get a route
//! layer that resolves the bearer token against the users schema and either
//! lets the request through with a [`Principal`] in its extensions or denies
//! it according to the group's [`Denial`].

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Router;
use atelier_core::models::UserProfile;
use tracing::debug;

use crate::db::hash_token;
use crate::http::error::ApiError;
use crate::state::AppState;

/// Where unauthenticated page requests are sent
pub const LOGIN_PATH: &str = "/login";

/// How a protected route answers a request without a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// 401 JSON error (API routes)
    Unauthorized,
    /// 307 to the login page, remembering the requested path (page routes)
    RedirectToLogin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected(Denial),
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: UserProfile,
}

impl Principal {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller, if any. Unknown or expired tokens resolve to `None`.
pub async fn resolve_principal(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Principal>, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let user = state
        .users()
        .user_for_token_hash(&hash_token(token))
        .await
        .map_err(|e| ApiError::database("Failed to verify session", e))?;

    Ok(user.map(|user| Principal { user }))
}

/// `/login?next=<requested path and query>`
pub fn login_redirect(uri: &Uri) -> Redirect {
    let requested = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Redirect::temporary(&format!(
        "{LOGIN_PATH}?next={}",
        urlencoding::encode(requested)
    ))
}

async fn authorize(state: AppState, denial: Denial, mut req: Request, next: Next) -> Response {
    let resolved = resolve_principal(&state, req.headers()).await;

    match resolved {
        Ok(Some(principal)) => {
            debug!(user_id = %principal.user_id(), path = %req.uri().path(), "session accepted");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Ok(None) => {
            debug!(path = %req.uri().path(), ?denial, "no live session");
            match denial {
                Denial::Unauthorized => ApiError::Unauthorized.into_response(),
                Denial::RedirectToLogin => login_redirect(req.uri()).into_response(),
            }
        }
        Err(e) => e.into_response(),
    }
}

async fn require_api_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(state, Denial::Unauthorized, req, next).await
}

async fn require_page_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    authorize(state, Denial::RedirectToLogin, req, next).await
}

/// Apply `access` to every route in `router`.
pub fn protect(router: Router<AppState>, state: &AppState, access: Access) -> Router<AppState> {
    match access {
        Access::Public => router,
        Access::Protected(Denial::Unauthorized) => router.route_layer(
            middleware::from_fn_with_state(state.clone(), require_api_session),
        ),
        Access::Protected(Denial::RedirectToLogin) => router.route_layer(
            middleware::from_fn_with_state(state.clone(), require_page_session),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parses_bearer_tokens() {
        assert_eq!(bearer_token(&headers("Bearer tok_1")), Some("tok_1"));
        assert_eq!(bearer_token(&headers("bearer  tok_1 ")), Some("tok_1"));
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn login_redirect_keeps_requested_path() {
        let uri: Uri = "/dashboard?tab=billing".parse().unwrap();
        let response = login_redirect(&uri).into_response();

        assert_eq!(response.status(), axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()["location"],
            "/login?next=%2Fdashboard%3Ftab%3Dbilling"
        );
    }
}
