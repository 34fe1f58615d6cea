//! Support tag repository (`support` schema)

use async_trait::async_trait;
use atelier_core::models::SupportTag;
use sqlx::{PgPool, Row};

use super::{DbError, SupportStore};

pub struct PgSupportStore {
    pool: PgPool,
}

impl PgSupportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupportStore for PgSupportStore {
    async fn active_tags(&self) -> Result<Vec<SupportTag>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, is_active, color, description, created_at
            FROM support_tags
            WHERE is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> Result<SupportTag, DbError> {
                Ok(SupportTag {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                    is_active: r.try_get("is_active")?,
                    color: r.try_get("color")?,
                    description: r.try_get("description")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }
}
