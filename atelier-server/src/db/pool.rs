//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits, one pool per schema.

use atelier_core::{DatabaseUrls, Schema};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for each schema's pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/atelier_app").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// The four schema pools, constructed once per process.
#[derive(Debug, Clone)]
pub struct Databases {
    pub app: PgPool,
    pub blog: PgPool,
    pub support: PgPool,
    pub users: PgPool,
}

/// Failure to connect one of the schema pools
#[derive(Debug, thiserror::Error)]
#[error("failed to connect to the {schema} database: {source}")]
pub struct ConnectError {
    pub schema: Schema,
    #[source]
    pub source: sqlx::Error,
}

impl Databases {
    pub async fn connect(urls: &DatabaseUrls) -> Result<Self, ConnectError> {
        Self::connect_with_options(urls, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn connect_with_options(
        urls: &DatabaseUrls,
        max_connections: u32,
    ) -> Result<Self, ConnectError> {
        let connect = |schema: Schema| async move {
            let pool = create_pool_with_options(urls.get(schema), max_connections)
                .await
                .map_err(|source| ConnectError { schema, source })?;
            tracing::debug!(%schema, max_connections, "database pool ready");
            Ok::<_, ConnectError>(pool)
        };

        Ok(Self {
            app: connect(Schema::App).await?,
            blog: connect(Schema::Blog).await?,
            support: connect(Schema::Support).await?,
            users: connect(Schema::Users).await?,
        })
    }

    pub fn pool(&self, schema: Schema) -> &PgPool {
        match schema {
            Schema::App => &self.app,
            Schema::Blog => &self.blog,
            Schema::Support => &self.support,
            Schema::Users => &self.users,
        }
    }

    /// Close every pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        for schema in Schema::ALL {
            self.pool(schema).close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require real databases
    // Run with: DATABASE_URL_APP=... (all four) cargo test -p atelier-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn connects_every_schema() {
        let urls = DatabaseUrls::from_env().expect("DATABASE_URL_* required");
        let databases = Databases::connect(&urls).await.expect("connect failed");

        for schema in Schema::ALL {
            let result: (i32,) = sqlx::query_as("SELECT 1")
                .fetch_one(databases.pool(schema))
                .await
                .expect("query failed");
            assert_eq!(result.0, 1);
        }
    }
}
