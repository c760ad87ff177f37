//! CLI execution context.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use mart_db::Db;
use mart_storefront::AppConfig;

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Store configuration.
    pub config: AppConfig,
    /// Where the configuration was read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file, or the nearest one above
    /// the working directory. Without either, defaults apply.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => AppConfig::find(&cwd),
        };
        let config = match &config_path {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Open the configured database.
    pub async fn db(&self) -> Result<Db> {
        let url = &self.config.database.url;
        self.output.debug(&format!("Opening {}", url));
        Db::connect_with(&self.config.db_options())
            .await
            .with_context(|| format!("Failed to open database {}", url))
    }
}
