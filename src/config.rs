//! TOML configuration parsing and validation.
//!
//! Every section has defaults, so an empty file (or [`Config::minimal`])
//! yields a working setup:
//!
//! ```toml
//! [db]
//! path = "./data/roster.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:5000"
//! max_upload_bytes = 52428800
//!
//! [uploads]
//! dir = "./uploads"
//!
//! [client]
//! base_url = "http://127.0.0.1:5000"
//! default_limit = 10
//! search_cap = 10000
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use roster_core::search::DEFAULT_SEARCH_CAP;

/// Page sizes offered by the table widget.
pub const LIMIT_CHOICES: [u64; 4] = [10, 20, 50, 100];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/roster.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

/// Where uploaded files are spooled before parsing.
///
/// Files are removed after a successful import only; failed imports leave
/// theirs behind for inspection.
#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Maximum records fetched for a full-scan search.
    #[serde(default = "default_search_cap")]
    pub search_cap: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_limit: default_limit(),
            search_cap: default_search_cap(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_limit() -> u64 {
    10
}
fn default_search_cap() -> u64 {
    DEFAULT_SEARCH_CAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// All-defaults configuration, used by client commands when no config
    /// file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be > 0");
    }

    if !LIMIT_CHOICES.contains(&config.client.default_limit) {
        anyhow::bail!(
            "client.default_limit must be one of {:?}, got {}",
            LIMIT_CHOICES,
            config.client.default_limit
        );
    }

    // A smaller cap could not even fill the largest page.
    let max_choice = LIMIT_CHOICES[LIMIT_CHOICES.len() - 1];
    if config.client.search_cap < max_choice {
        anyhow::bail!("client.search_cap must be >= {}", max_choice);
    }

    if !config.client.base_url.starts_with("http://")
        && !config.client.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "client.base_url must start with http:// or https://, got '{}'",
            config.client.base_url
        );
    }

    Ok(())
}
