//! Configuration file location and initialization.
//!
//! The file itself is parsed by `libregscan::Config`; this module only knows
//! where it lives and how to write a fresh one.

use libregscan::Config;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "REGSCAN_CONFIG";

/// Default config file path, `<config_dir>/regscan/config.yaml`.
pub fn default_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("regscan").join("config.yaml"),
        None => PathBuf::from("config.yaml"),
    }
}

/// Loads the configuration.
///
/// An explicitly given file must exist. The default file is optional and
/// defaults are used when it is missing.
pub fn load_config(path: &Path, explicit: bool) -> Result<Config, String> {
    let file = if explicit || path.exists() {
        Some(path)
    } else {
        None
    };
    Config::load(file).map_err(|e| e.to_string())
}

/// Renders the default configuration as YAML.
pub fn default_config_yaml() -> Result<String, String> {
    serde_yaml::to_string(&Config::default())
        .map_err(|e| format!("Failed to serialize configuration: {}", e))
}

/// Writes the default configuration to `path`, creating parent directories.
pub fn init_config(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }

    fs::write(path, default_config_yaml()?)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
