//! HTTP server command
//!
//! Connects the four schema databases, optionally migrates them, and serves
//! the API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::Parser;

use atelier_core::{DatabaseUrls, PublicConfig, RuntimeEnv};
use atelier_server::db::migrations;
use atelier_server::{run_server, AppState, Databases, ServerConfig, Stores};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins); refused in production
    #[arg(long)]
    pub cors_permissive: bool,

    /// Run schema migrations before serving
    #[arg(long)]
    pub migrate: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let runtime = RuntimeEnv::from_env();
    if runtime.is_production() && args.cors_permissive {
        bail!("--cors-permissive is not allowed when NODE_ENV=production");
    }

    let urls = DatabaseUrls::from_env()
        .context("Database URLs not set. Set DATABASE_URL_* in the environment or ~/.atelier/.env")?;
    tracing::debug!(?urls, "database configuration");

    let databases = Databases::connect(&urls)
        .await
        .context("Failed to create database pools")?;

    if args.migrate {
        migrations::run_all(&databases)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let public_config = PublicConfig::from_env();
    tracing::info!(
        env = runtime.as_str(),
        turnstile = public_config.turnstile_site_key.is_some(),
        umami = public_config.umami_website_id.is_some(),
        "Starting atelier server on {}",
        args.bind
    );

    let state = AppState::new(Stores::postgres(&databases), public_config);
    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Blocks until shutdown
    let served = run_server(state, config).await.context("Server error");
    databases.close().await;
    served
}
