//! Configuration loader
//!
//! Reads a YAML file, parses it into [`RawConfig`], and validates it into
//! a [`CoordinatorConfig`]. An empty file yields the defaults.

use std::path::Path;

use tracing::debug;

use crate::config::schema::{CoordinatorConfig, RawConfig};
use crate::error::ConfigError;

/// Environment variable naming the configuration file for the CLI.
pub const CONFIG_ENV: &str = "VTSHIM_CONFIG";

/// Loads and validates the configuration file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, has
/// unknown fields, or fails validation.
pub fn load_config(path: &Path) -> Result<CoordinatorConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    debug!(path = %path.display(), bytes = raw.len(), "loading configuration");
    parse_config(&raw, path)
}

/// Parses and validates configuration text. `origin` is used in errors.
///
/// # Errors
///
/// Returns an error if the text is not valid YAML, has unknown fields,
/// or fails validation.
pub fn parse_config(text: &str, origin: &Path) -> Result<CoordinatorConfig, ConfigError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Ok(CoordinatorConfig::default());
    }

    let raw: Option<RawConfig> =
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

    CoordinatorConfig::try_from(raw.unwrap_or_default())
}

/// Loads `path` when given, otherwise returns the defaults.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_or_default(path: Option<&Path>) -> Result<CoordinatorConfig, ConfigError> {
    path.map_or_else(|| Ok(CoordinatorConfig::default()), load_config)
}
