//! Schema migrations, one independent set per database
//!
//! Statements are idempotent (`IF NOT EXISTS`) so every set can run on each
//! start. No statement references a table in another schema.

use atelier_core::Schema;
use sqlx::PgPool;

use super::pool::Databases;

const APP: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS blueprints (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        visibility TEXT NOT NULL DEFAULT 'private'
            CHECK (visibility IN ('public', 'unlisted', 'private')),
        tier TEXT NOT NULL DEFAULT 'free'
            CHECK (tier IN ('free', 'pro', 'team')),
        kind TEXT NOT NULL
            CONSTRAINT blueprints_kind_format CHECK (kind ~ '^[a-z0-9][a-z0-9_-]{0,31}$'),
        owner_id TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS blueprints_owner_idx ON blueprints (owner_id)",
    "CREATE INDEX IF NOT EXISTS blueprints_visibility_idx ON blueprints (visibility, created_at DESC)",
];

const BLOG: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        excerpt TEXT,
        body TEXT NOT NULL,
        author_id TEXT NOT NULL,
        published_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_published_idx ON posts (published_at DESC) WHERE published_at IS NOT NULL",
];

const SUPPORT: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS support_tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        color TEXT,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const USERS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        display_name TEXT,
        avatar_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subscriptions (
        user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        plan TEXT NOT NULL DEFAULT 'free' CHECK (plan IN ('free', 'pro', 'team')),
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'trialing', 'past_due', 'canceled')),
        current_period_end TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token_hash TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        expires_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS sessions_user_idx ON sessions (user_id)",
];

/// Statements for one schema, in order
pub fn statements(schema: Schema) -> &'static [&'static str] {
    match schema {
        Schema::App => APP,
        Schema::Blog => BLOG,
        Schema::Support => SUPPORT,
        Schema::Users => USERS,
    }
}

/// Run one schema's migrations against its pool
pub async fn run(schema: Schema, pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!(%schema, "Running migrations");

    for statement in statements(schema) {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Run every schema's migrations. Stops at the first failing schema.
pub async fn run_all(databases: &Databases) -> Result<(), MigrationError> {
    for schema in Schema::ALL {
        run(schema, databases.pool(schema))
            .await
            .map_err(|source| MigrationError { schema, source })?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("migrations failed for the {schema} schema: {source}")]
pub struct MigrationError {
    pub schema: Schema,
    #[source]
    pub source: sqlx::Error,
}
