//! Schema migrations

use anyhow::{Context, Result};
use atelier_core::{DatabaseUrls, Schema};
use atelier_server::db::migrations;
use atelier_server::Databases;

/// Apply every schema's migrations. Safe to run repeatedly.
pub async fn run_migrate() -> Result<()> {
    let urls = DatabaseUrls::from_env().context("Database URLs not set")?;
    let databases = Databases::connect(&urls)
        .await
        .context("Failed to create database pools")?;

    let result = migrations::run_all(&databases).await;
    databases.close().await;
    result.context("Failed to run migrations")?;

    for schema in Schema::ALL {
        println!(
            "{schema}: {} statements applied",
            migrations::statements(schema).len()
        );
    }
    Ok(())
}
