//! Blog endpoints, posts joined with their authors

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use atelier_core::models::PostWithAuthor;

use crate::compose::posts_with_authors;
use crate::http::error::ApiError;
use crate::http::extractors::ApiQuery;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

impl ListParams {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET /api/blog/posts - published posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = state
        .blog()
        .list_published(params.limit())
        .await
        .map_err(|e| ApiError::database("Failed to fetch posts", e))?;

    let joined = posts_with_authors(state.users(), posts)
        .await
        .map_err(|e| ApiError::database("Failed to fetch post authors", e))?;

    Ok(Json(joined))
}

/// GET /api/blog/posts/{slug}
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostWithAuthor>, ApiError> {
    let not_found = || ApiError::NotFound {
        resource: "post",
        id: slug.clone(),
    };

    let post = state
        .blog()
        .published_by_slug(&slug)
        .await
        .map_err(|e| ApiError::database("Failed to fetch post", e))?
        .ok_or_else(not_found)?;

    let mut joined = posts_with_authors(state.users(), vec![post])
        .await
        .map_err(|e| ApiError::database("Failed to fetch post author", e))?;

    joined.pop().map(Json).ok_or_else(not_found)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/blog/posts", get(list_posts))
        .route("/api/blog/posts/{slug}", get(get_post))
}
