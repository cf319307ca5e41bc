pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

use anyhow::{Context, Result};
use subway_core::SubwayConfig;

/// Pick the database URL: flag or `DATABASE_URL`, then the config file.
pub(crate) fn database_url(arg: Option<String>, config: &SubwayConfig) -> Result<String> {
    arg.or_else(|| config.database.url.clone()).context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, ~/.subway/.env \
         or [database] url in ~/.subway/config.toml",
    )
}
