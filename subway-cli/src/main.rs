//! subway CLI - admin backend for subway lines, stations and sections
//!
//! - `subway serve`: run the REST API (PostgreSQL, or `--in-memory`)
//! - `subway migrate`: create the database schema

use anyhow::Result;
use clap::{Parser, Subcommand};
use subway_core::SubwayConfig;

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "subway",
    author,
    version,
    about = "Subway line administration backend",
    long_about = "Manage subway lines, stations and the sections between them over a REST API \
                  backed by PostgreSQL."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the database schema (idempotent)
    Migrate(commands::migrate::MigrateArgs),
}

/// Load `.env` from the working directory, then `~/.subway/.env`.
/// Variables already set are never overwritten.
fn load_env() {
    dotenvy::dotenv().ok();
    if let Some(home) = dirs::home_dir() {
        dotenvy::from_path(home.join(".subway").join(".env")).ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so `env = "DATABASE_URL"` sees .env values
    load_env();
    let cli = Cli::parse();

    init_tracing(&TracingConfig { debug: cli.debug }).ok();
    let config = SubwayConfig::load()?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::Migrate(args) => commands::run_migrate(args, config).await?,
    }

    Ok(())
}
