//! Application configuration.
//!
//! Read from `mart.toml` (or `.json` by extension). Every section and field
//! has a default, so an empty file is a valid configuration.

use mart_auth::PasswordHasher;
use mart_commerce::dashboard::DEFAULT_LOW_STOCK_THRESHOLD;
use mart_db::DbOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched for, in order, by [`AppConfig::find`].
pub const CONFIG_FILES: [&str; 3] = ["mart.toml", ".mart.toml", "mart.json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Storefront configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub accounts: AccountsConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

impl AppConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let parsed = if is_json(path) {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            toml::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look for a config file in `start` and its parents.
    pub fn find(start: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = Some(start.as_ref());
        while let Some(current) = dir {
            for name in CONFIG_FILES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            dir = current.parent();
        }
        None
    }

    pub fn db_options(&self) -> DbOptions {
        DbOptions {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::new(
            self.accounts.hash_memory_kib,
            self.accounts.hash_iterations,
            self.accounts.hash_parallelism,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite:freshmart.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Account and password settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Let the public registration form create admin and logistics accounts.
    #[serde(default)]
    pub allow_staff_self_registration: bool,

    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,

    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,

    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

fn default_hash_memory_kib() -> u32 {
    PasswordHasher::default().memory_kib
}

fn default_hash_iterations() -> u32 {
    PasswordHasher::default().iterations
}

fn default_hash_parallelism() -> u32 {
    PasswordHasher::default().parallelism
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            allow_staff_self_registration: false,
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Products with less stock than this are listed on the admin dashboard.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Contents of a fresh `mart.toml`.
pub fn generate_default_config(database_url: &str) -> String {
    format!(
        r#"# FreshMart configuration

[database]
url = "{database_url}"
max_connections = 5

[accounts]
# Allow /register to create admin and logistics accounts.
allow_staff_self_registration = false

[catalog]
low_stock_threshold = {DEFAULT_LOW_STOCK_THRESHOLD}

[logging]
# Overridden by RUST_LOG.
level = "info"
# "pretty" or "json"
format = "pretty"
"#
    )
}
