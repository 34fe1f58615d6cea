//! User, subscription, and session repository (`users` schema)

use async_trait::async_trait;
use atelier_core::models::{Subscription, UserProfile};
use sha2::{Digest, Sha256};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{parse_column, DbError, UsersStore};

/// Sessions store only this digest; the bearer token itself never touches
/// the database.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub struct PgUsersStore {
    pool: PgPool,
}

impl PgUsersStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, DbError> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UsersStore for PgUsersStore {
    async fn profiles_by_ids(&self, ids: &[String]) -> Result<Vec<UserProfile>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, username, email, display_name, avatar_url, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn profile(&self, id: &str) -> Result<Option<UserProfile>, DbError> {
        sqlx::query(
            r#"
            SELECT id, username, email, display_name, avatar_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(profile_from_row)
        .transpose()
    }

    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>, DbError> {
        let Some(row) = sqlx::query(
            r#"
            SELECT user_id, plan, status, current_period_end
            FROM subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let plan: String = row.try_get("plan")?;
        let status: String = row.try_get("status")?;

        Ok(Some(Subscription {
            user_id: row.try_get("user_id")?,
            plan: parse_column("subscriptions", &plan)?,
            status: parse_column("subscriptions", &status)?,
            current_period_end: row.try_get("current_period_end")?,
        }))
    }

    async fn user_for_token_hash(&self, token_hash: &str) -> Result<Option<UserProfile>, DbError> {
        sqlx::query(
            r#"
            SELECT u.id, u.username, u.email, u.display_name, u.avatar_url, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(profile_from_row)
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_hex_sha256() {
        let hash = hash_token("tok_123");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_token("tok_123"));
        assert_ne!(hash, hash_token("tok_124"));
    }

    #[test]
    fn token_hash_known_vector() {
        assert_eq!(
            hash_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
