//! Blog post repository (`blog` schema)

use async_trait::async_trait;
use atelier_core::models::BlogPost;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{BlogStore, DbError};

pub struct PgBlogStore {
    pool: PgPool,
}

impl PgBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> Result<BlogPost, DbError> {
    Ok(BlogPost {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        excerpt: row.try_get("excerpt")?,
        body: row.try_get("body")?,
        author_id: row.try_get("author_id")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn list_published(&self, limit: i64) -> Result<Vec<BlogPost>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, title, excerpt, body, author_id, published_at, created_at
            FROM posts
            WHERE published_at IS NOT NULL AND published_at <= NOW()
            ORDER BY published_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn published_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, DbError> {
        sqlx::query(
            r#"
            SELECT id, slug, title, excerpt, body, author_id, published_at, created_at
            FROM posts
            WHERE slug = $1 AND published_at IS NOT NULL AND published_at <= NOW()
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(post_from_row)
        .transpose()
    }
}
