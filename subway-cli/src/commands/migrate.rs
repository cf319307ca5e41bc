//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;
use subway_core::SubwayConfig;
use subway_server::db::{create_pool, migrations};

use super::database_url;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create the subway tables if they do not exist yet
pub async fn run_migrate(args: MigrateArgs, config: SubwayConfig) -> Result<()> {
    let url = database_url(args.database_url, &config)?;
    let pool = create_pool(&url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    println!("Migrations applied");
    Ok(())
}
