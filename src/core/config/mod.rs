//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit path (`--config`)
//! 2. `$IMGMETA_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/imgmeta/config.toml`
//! 4. `~/.imgmeta/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use imgmeta::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Embedded first: {}", config.save_in_image_file());
//! println!("Local sidecars: {}", config.sidecar_local());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, SidecarConfig, DEFAULT_DIR_MODE};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::durable::{DurableWriteError, ScopedWrite};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "IMGMETA_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file: {0}")]
    CommitError(#[from] DurableWriteError),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaulting accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File contents (all fields optional)
    pub global: GlobalConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Wrap an already-parsed config.
    pub fn from_global(global: GlobalConfig) -> Self {
        Self { global, path: None }
    }

    /// Load configuration from an explicit path or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. Missing config files are not an error (defaults are
    /// used); a missing explicit path is.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, path) = match explicit {
            Some(path) => (Self::read_config(path)?, Some(path.to_path_buf())),
            None => Self::load_default(&mut warnings)?,
        };

        global.validate()?;

        Ok(ConfigLoadResult {
            config: Config { global, path },
            warnings,
        })
    }

    /// Load from the standard locations.
    fn load_default(
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $IMGMETA_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
            warnings.push(ConfigWarning {
                message: format!("{} points to a missing file, ignoring it", CONFIG_ENV),
                path,
            });
        }

        // 2. Check $XDG_CONFIG_HOME/imgmeta/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("imgmeta/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.imgmeta/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".imgmeta/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.imgmeta/config.toml`.
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".imgmeta/config.toml"))
    }

    /// Write config atomically to `path`.
    ///
    /// Creates parent directories if needed.
    pub fn write_to(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let mut out = ScopedWrite::open(path)?;
        out.append(&contents)?;
        out.commit()?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Check if metadata should be written into the image file first.
    ///
    /// Defaults to `false` if not configured.
    pub fn save_in_image_file(&self) -> bool {
        self.global.save_in_image_file.unwrap_or(false)
    }

    /// Check if new sidecars go next to the image.
    ///
    /// Defaults to `false` (cache directory) if not configured.
    pub fn sidecar_local(&self) -> bool {
        self.global
            .sidecar
            .as_ref()
            .and_then(|s| s.local)
            .unwrap_or(false)
    }

    /// Get the cache root for sidecars.
    ///
    /// Defaults to `<user cache dir>/imgmeta`, falling back to
    /// `~/.cache/imgmeta`.
    pub fn cache_root(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = self.global.sidecar.as_ref().and_then(|s| s.cache_dir.clone()) {
            return Ok(dir);
        }

        if let Some(cache) = dirs::cache_dir() {
            return Ok(cache.join("imgmeta"));
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".cache/imgmeta"))
    }

    /// Get the mode for created sidecar directories.
    ///
    /// Defaults to `0755` if not configured.
    pub fn dir_mode(&self) -> u32 {
        self.global
            .sidecar
            .as_ref()
            .and_then(|s| s.dir_mode().ok())
            .unwrap_or(DEFAULT_DIR_MODE)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert!(!config.save_in_image_file());
        assert!(!config.sidecar_local());
        assert_eq!(config.dir_mode(), 0o755);
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
            save_in_image_file = true

            [sidecar]
            local = true
            cache_dir = "/tmp/imgmeta-cache"
            dir_mode = "0700"
            "#,
        )
        .unwrap();

        let result = Config::load(Some(&config_path)).unwrap();
        let config = result.config;

        assert!(config.save_in_image_file());
        assert!(config.sidecar_local());
        assert_eq!(
            config.cache_root().unwrap(),
            PathBuf::from("/tmp/imgmeta-cache")
        );
        assert_eq!(config.dir_mode(), 0o700);
        assert_eq!(config.loaded_from(), Some(config_path.as_path()));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_explicit_path_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "unknown_field = true").unwrap();

        let result = Config::load(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_mode_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[sidecar]\ndir_mode = \"999\"").unwrap();

        let result = Config::load(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn write_config_atomic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        let config = GlobalConfig {
            save_in_image_file: Some(true),
            ..Default::default()
        };

        Config::write_to(&path, &config).unwrap();

        assert!(path.exists());
        let loaded = Config::load(Some(&path)).unwrap();
        assert!(loaded.config.save_in_image_file());
    }

    #[test]
    fn write_rejects_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let config = GlobalConfig {
            sidecar: Some(SidecarConfig {
                dir_mode: Some("nope".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(Config::write_to(&path, &config).is_err());
        assert!(!path.exists());
    }
}
