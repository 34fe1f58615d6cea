//! API routes
//!
//! Routes are grouped by access. Public groups are mounted as-is; protected
//! groups go through [`guard::protect`] with the denial their clients expect.

pub mod blog;
pub mod blueprints;
pub mod dashboard;
pub mod health;
pub mod me;
pub mod public_config;
pub mod support;
pub mod templates;

use axum::Router;

use crate::http::guard::{self, Access, Denial};
use crate::state::AppState;

/// Every route with its access rule applied
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .merge(health::router())
        .merge(public_config::router())
        .merge(support::router())
        .merge(templates::router())
        .merge(blog::router())
        .merge(blueprints::public_router());

    let protected_api = Router::new()
        .merge(me::router())
        .merge(blueprints::protected_router());

    let protected_pages = dashboard::router();

    Router::new()
        .merge(guard::protect(public, &state, Access::Public))
        .merge(guard::protect(
            protected_api,
            &state,
            Access::Protected(Denial::Unauthorized),
        ))
        .merge(guard::protect(
            protected_pages,
            &state,
            Access::Protected(Denial::RedirectToLogin),
        ))
        .with_state(state)
}
