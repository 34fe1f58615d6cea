//! Blueprint repository (`app` schema)

use async_trait::async_trait;
use atelier_core::models::{Blueprint, BlueprintDraft, BlueprintFilter};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{parse_column, AppStore, DbError, BLUEPRINT_LIST_LIMIT};

const COLUMNS: &str =
    "id, title, description, visibility, tier, kind, owner_id, created_at, updated_at";

pub struct PgAppStore {
    pool: PgPool,
}

impl PgAppStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn blueprint_from_row(row: &PgRow) -> Result<Blueprint, DbError> {
    let visibility: String = row.try_get("visibility")?;
    let tier: String = row.try_get("tier")?;

    Ok(Blueprint {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        visibility: parse_column("blueprints", &visibility)?,
        tier: parse_column("blueprints", &tier)?,
        kind: row.try_get("kind")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AppStore for PgAppStore {
    async fn list_public(&self, filter: &BlueprintFilter) -> Result<Vec<Blueprint>, DbError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM blueprints
            WHERE visibility = 'public'
              AND ($1::text IS NULL OR tier = $1)
              AND ($2::text IS NULL OR kind = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(filter.tier.map(|t| t.as_str()))
            .bind(filter.kind.as_deref())
            .bind(BLUEPRINT_LIST_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(blueprint_from_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Blueprint>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM blueprints WHERE id = $1");

        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(blueprint_from_row)
            .transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Blueprint>, DbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM blueprints WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2"
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(BLUEPRINT_LIST_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(blueprint_from_row).collect()
    }

    async fn insert(&self, owner_id: &str, draft: &BlueprintDraft) -> Result<Blueprint, DbError> {
        let sql = format!(
            r#"
            INSERT INTO blueprints (id, title, description, visibility, tier, kind, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&draft.title)
            .bind(draft.description.as_deref())
            .bind(draft.visibility.as_str())
            .bind(draft.tier.as_str())
            .bind(&draft.kind)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        blueprint_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::{Tier, Visibility};

    // Integration tests - run with DATABASE_URL_APP set
    // cargo test -p atelier-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_then_get() {
        let url = std::env::var("DATABASE_URL_APP").expect("DATABASE_URL_APP required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        crate::db::migrations::run(atelier_core::Schema::App, &pool)
            .await
            .expect("migrations failed");

        let store = PgAppStore::new(pool);
        let draft =
            BlueprintDraft::new("Release checklist", None, Visibility::Private, Tier::Free, "workflow")
                .unwrap();
        let created = store.insert("user_itest", &draft).await.unwrap();

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.owner_id, "user_itest");
        assert_eq!(fetched.visibility, Visibility::Private);
    }
}
