//! HTTP server command
//!
//! Runs the subway admin API against PostgreSQL, or against an in-process
//! store with `--in-memory`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use subway_core::SubwayConfig;
use subway_server::db::{create_pool_with_options, migrations};
use subway_server::{run_server, AppState, ServerConfig};

use super::database_url;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: [server] bind, else 127.0.0.1:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep everything in memory instead of PostgreSQL (data is lost on exit).
    /// Any database URL is ignored.
    #[arg(long)]
    pub in_memory: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Merge flags over the config file.
fn server_config(args: &ServeArgs, config: &SubwayConfig) -> Result<ServerConfig> {
    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid [server] bind address: {}", config.server.bind))?,
    };

    Ok(ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
        request_timeout: Duration::from_secs(args.timeout.unwrap_or(config.server.timeout_secs)),
    })
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: SubwayConfig) -> Result<()> {
    let server_config = server_config(&args, &config)?;

    let state = if args.in_memory {
        tracing::warn!("Using in-memory store - data is lost on shutdown");
        AppState::in_memory()
    } else {
        let url = database_url(args.database_url, &config)?;
        let pool = create_pool_with_options(&url, &config.database)
            .await
            .context("Failed to create database pool")?;
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
        AppState::postgres(pool)
    };

    tracing::info!("Starting subway server on {}", server_config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
