//! Tool configuration.
//!
//! Settings come from one optional TOML file. Lookup order:
//!
//! 1. the file named by `--config` (it must exist)
//! 2. `filinator.toml` in the working directory, if present
//! 3. stock defaults
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! default_output = "output"  # Copy destination for --encode without --output
//! dir_mode = 0o755           # Mode of directories created by copy/decode (Unix)
//! encode_in_place = false    # Rename in place instead of copying by default
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "filinator.toml";

pub const DEFAULT_OUTPUT: &str = "output";

pub const DEFAULT_DIR_MODE: u32 = 0o755;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Settings loaded from `filinator.toml`.
///
/// Every field has a default; a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Copy destination used by `--encode` when `--output` is not given.
    pub default_output: String,
    /// Permission bits for directories the tool creates. Ignored off Unix.
    pub dir_mode: u32,
    /// Make `--encode` without `--output` rename in place.
    pub encode_in_place: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            default_output: DEFAULT_OUTPUT.to_string(),
            dir_mode: DEFAULT_DIR_MODE,
            encode_in_place: false,
        }
    }
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_output must not be empty".into(),
            ));
        }
        if self.dir_mode > 0o7777 {
            return Err(ConfigError::Validation(format!(
                "dir_mode {:#o} has bits outside 0o7777",
                self.dir_mode
            )));
        }
        Ok(())
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Deserialize an optional raw value over the stock defaults and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let config = match overlay {
        Some(value) => value.try_into()?,
        None => ToolConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Load the config for this run.
///
/// An explicit path must exist. Without one, `filinator.toml` in `cwd` is
/// used when present.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<ToolConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(
            load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?,
        ),
        None => load_raw_config(&cwd.join(CONFIG_FILE_NAME))?,
    };
    resolve_config(overlay)
}

/// A fully commented config file with every key at its default.
pub fn stock_config_toml() -> &'static str {
    r##"# filinator configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Looked up as ./filinator.toml unless --config names another file.
# Unknown keys will cause an error.

# Directory that --encode copies into when --output is not given.
# Relative to the working directory; created if missing.
default_output = "output"

# Permission bits for directories created while copying or decoding.
# Ignored on platforms without Unix permissions.
dir_mode = 0o755

# When true, --encode without --output renames files in place
# instead of copying them into default_output.
encode_in_place = false
"##
}
