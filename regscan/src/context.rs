//! Application context that holds resolved configuration
//!
//! Built once from the global CLI flags and passed read-only to every
//! command handler.

use crate::config;
use crate::format::{ColorChoice, OutputFormatter, create_formatter};
use libregscan::Config;
use std::path::PathBuf;

/// Application context with resolved configuration and runtime state
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// File the configuration was read from, or would be written to
    pub config_path: PathBuf,
    /// Status output
    pub formatter: Box<dyn OutputFormatter>,
}

impl AppContext {
    /// Build the context. `config_arg` comes from `--config` or `$REGSCAN_CONFIG`.
    pub fn build(config_arg: Option<PathBuf>, color: ColorChoice) -> Result<Self, String> {
        let explicit = config_arg.is_some();
        let config_path = config_arg.unwrap_or_else(config::default_config_path);
        let config = config::load_config(&config_path, explicit)?;

        Ok(Self {
            config,
            config_path,
            formatter: create_formatter(color),
        })
    }
}
