//! Repository implementations, one per schema
//!
//! Each store trait covers exactly one schema. A Postgres implementation
//! holds that schema's pool and nothing else, so a query can never reach
//! across a schema boundary.

pub mod app;
pub mod blog;
pub mod support;
pub mod users;

use async_trait::async_trait;
use atelier_core::models::{
    BlogPost, Blueprint, BlueprintDraft, BlueprintFilter, Subscription, SupportTag, UserProfile,
    ValidationError,
};

pub use app::PgAppStore;
pub use blog::PgBlogStore;
pub use support::PgSupportStore;
pub use users::{hash_token, PgUsersStore};

/// Upper bound on rows returned by the blueprint list queries
pub const BLUEPRINT_LIST_LIMIT: i64 = 100;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A cross-schema reference points at a row that does not exist
    #[error("integrity violation: {reason}")]
    Integrity { reason: String },

    /// A stored value no longer parses into its domain type
    #[error("corrupt {table} row: {source}")]
    Corrupt {
        table: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// `app` schema: blueprints
#[async_trait]
pub trait AppStore: Send + Sync {
    /// Public blueprints matching `filter`, newest first
    async fn list_public(&self, filter: &BlueprintFilter) -> Result<Vec<Blueprint>, DbError>;

    async fn get(&self, id: &str) -> Result<Option<Blueprint>, DbError>;

    /// Every blueprint owned by `owner_id`, newest first
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Blueprint>, DbError>;

    /// Insert without checking the owner; see `compose::create_blueprint_checked`
    async fn insert(&self, owner_id: &str, draft: &BlueprintDraft) -> Result<Blueprint, DbError>;
}

/// `users` schema: profiles, subscriptions, sessions
#[async_trait]
pub trait UsersStore: Send + Sync {
    /// Profiles for the given ids. Unknown ids are skipped, order is unspecified.
    async fn profiles_by_ids(&self, ids: &[String]) -> Result<Vec<UserProfile>, DbError>;

    async fn profile(&self, id: &str) -> Result<Option<UserProfile>, DbError>;

    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>, DbError>;

    /// User owning an unexpired session with this token hash
    async fn user_for_token_hash(&self, token_hash: &str) -> Result<Option<UserProfile>, DbError>;
}

/// `support` schema: helpdesk tags
#[async_trait]
pub trait SupportStore: Send + Sync {
    /// Active tags only, ordered by name ascending
    async fn active_tags(&self) -> Result<Vec<SupportTag>, DbError>;
}

/// `blog` schema: posts
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Published posts, newest first, at most `limit`
    async fn list_published(&self, limit: i64) -> Result<Vec<BlogPost>, DbError>;

    async fn published_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, DbError>;
}

/// Parse a TEXT column into a domain enum, reporting the table on failure.
pub(crate) fn parse_column<T>(table: &'static str, value: &str) -> Result<T, DbError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    value
        .parse()
        .map_err(|source| DbError::Corrupt { table, source })
}
