use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default bind address for the HTTP server
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Configuration for the subway admin backend (~/.subway/config.toml)
///
/// Every section is optional; missing keys fall back to defaults and CLI
/// flags or environment variables override whatever the file says.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubwayConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub cors_permissive: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            cors_permissive: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// PostgreSQL connection string; `DATABASE_URL` takes precedence
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a free pooled connection
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl SubwayConfig {
    /// Load config from ~/.subway/config.toml, or defaults if it is absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            tracing::debug!("no config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).context("Failed to parse config file (invalid TOML)")
    }

    /// Get config directory path: ~/.subway
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".subway")
    }

    /// Get config file path: ~/.subway/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
