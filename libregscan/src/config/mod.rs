//! Application configuration.
//!
//! This module manages the remote registry configuration with sensible
//! defaults, loading from a YAML file and merging with `REGSCAN__*`
//! environment variables (`__` separates nested keys).

use crate::error::{Result, ScanError};
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Registry id meaning "every registry the logged-in account can see".
pub const WILDCARD_REGISTRY_ID: &str = "*";

/// Legacy spelling of the wildcard registry id.
pub const LEGACY_WILDCARD_REGISTRY_ID: &str = ".*.*";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: Remote,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default())?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// When a path is given the file must exist. Environment variables
    /// prefixed with `REGSCAN__` are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigRs::builder().add_source(ConfigRs::try_from(&Config::default())?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REGSCAN")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("remote.ecr.registry_ids")
                .with_list_parse_key("remote.pull.images")
                .with_list_parse_key("remote.pull.tags")
                .with_list_parse_key("remote.pull.digests"),
        );

        Self::from_builder(builder, path)
    }

    /// Creates a `Config` from a `config::ConfigBuilder`.
    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                ScanError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

/// Remote registry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Remote {
    /// Global switch. When false every manager operation is a no-op.
    #[serde(default)]
    pub enabled: bool,

    /// Prefix engine commands with `sudo` (honoured on Unix only).
    #[serde(default)]
    pub login_sudo: bool,

    #[serde(default)]
    pub pull: Pull,

    #[serde(default)]
    pub ecr: Ecr,
}

/// Image selection and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Pull {
    /// Regexes matched against repository names. Empty matches everything.
    #[serde(default)]
    pub images: Vec<String>,

    /// Regexes matched against image tags. Empty matches everything.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Regexes matched against canonical digests. Empty matches everything.
    #[serde(default)]
    pub digests: Vec<String>,

    /// Maximum number of images to pull per backend; 0 means unlimited.
    #[serde(default)]
    pub max_images: usize,

    /// Pull even when the image is already present in the local engine.
    #[serde(default)]
    pub force: bool,
}

/// Amazon ECR backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Ecr {
    #[serde(default)]
    pub enabled: bool,

    /// Registry (account) ids to scan. Blank means the default registry of
    /// the logged-in account; the wildcard means all, treated as default.
    #[serde(default)]
    pub registry_ids: Vec<String>,
}

/// Returns true when `id` is one of the wildcard spellings.
pub fn is_wildcard_registry_id(id: &str) -> bool {
    let id = id.trim();
    id == WILDCARD_REGISTRY_ID || id == LEGACY_WILDCARD_REGISTRY_ID
}
