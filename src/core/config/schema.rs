//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! Located at (in order of precedence):
//! 1. `$IMGMETA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/imgmeta/config.toml`
//! 3. `~/.imgmeta/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., `dir_mode` must be an octal permission mode).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default permission mode for directories created to hold sidecars.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// User configuration.
///
/// # Example
///
/// ```toml
/// save_in_image_file = true
///
/// [sidecar]
/// local = false
/// cache_dir = "/var/cache/imgmeta"
/// dir_mode = "0750"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Prefer writing metadata into the image file over sidecar files
    pub save_in_image_file: Option<bool>,

    /// Sidecar storage settings
    pub sidecar: Option<SidecarConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(sidecar) = &self.sidecar {
            sidecar.validate()?;
        }
        Ok(())
    }
}

/// Sidecar storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SidecarConfig {
    /// Store new sidecars in `.metadata/` next to the image
    pub local: Option<bool>,

    /// Override the cache root
    pub cache_dir: Option<PathBuf>,

    /// Mode for created directories, as an octal string (e.g. "0755")
    pub dir_mode: Option<String>,
}

impl SidecarConfig {
    /// Validate the sidecar configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(mode) = &self.dir_mode {
            parse_mode(mode)?;
        }

        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "sidecar.cache_dir cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The configured directory mode, or [`DEFAULT_DIR_MODE`].
    pub fn dir_mode(&self) -> Result<u32, ConfigError> {
        match &self.dir_mode {
            Some(mode) => parse_mode(mode),
            None => Ok(DEFAULT_DIR_MODE),
        }
    }
}

/// Parse an octal permission mode such as `"0755"` or `"750"`.
pub fn parse_mode(text: &str) -> Result<u32, ConfigError> {
    let digits = text.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);

    let mode = u32::from_str_radix(digits, 8).map_err(|_| {
        ConfigError::InvalidValue(format!("invalid directory mode '{}', expected octal", text))
    })?;

    if mode > 0o7777 {
        return Err(ConfigError::InvalidValue(format!(
            "directory mode '{}' out of range",
            text
        )));
    }

    Ok(mode)
}
