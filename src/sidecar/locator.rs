//! sidecar::locator
//!
//! Finding and allocating sidecar locations.
//!
//! # Lookup
//!
//! [`CacheLocator::find_existing`] checks the local location first, then
//! the cache location, and returns the first one that is a regular file.
//! [`CacheLocator::find_all`] returns both when both exist.
//!
//! # Allocation
//!
//! [`CacheLocator::allocate_new`] picks the local or cache location
//! according to configuration and creates any missing directories with the
//! configured mode (default `0755`).

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

use super::SidecarError;
use crate::core::config::Config;
use crate::core::paths::SidecarPaths;

/// Find-or-allocate service for sidecar paths.
///
/// Implementations must be cheap to call repeatedly; the engine asks again
/// on every operation and never caches the answer.
pub trait SidecarLocator {
    /// Path of an existing sidecar for `source`, if any.
    fn find_existing(&self, source: &Path) -> Option<PathBuf>;

    /// Every existing sidecar for `source`, in lookup order.
    fn find_all(&self, source: &Path) -> Vec<PathBuf> {
        self.find_existing(source).into_iter().collect()
    }

    /// A writable path for a new sidecar for `source`.
    ///
    /// Missing parent directories are created.
    fn allocate_new(&self, source: &Path) -> Result<PathBuf, SidecarError>;

    /// Whether an existing sidecar can be opened for writing.
    fn is_writable(&self, sidecar: &Path) -> bool {
        OpenOptions::new().append(true).open(sidecar).is_ok()
    }

    /// Delete a sidecar file.
    fn remove(&self, sidecar: &Path) -> Result<(), SidecarError> {
        fs::remove_file(sidecar).map_err(|source| SidecarError::Io {
            path: sidecar.to_path_buf(),
            source,
        })
    }
}

/// Locator backed by `.metadata/` directories and the user cache.
#[derive(Debug, Clone)]
pub struct CacheLocator {
    paths: SidecarPaths,
    prefer_local: bool,
    dir_mode: u32,
}

impl CacheLocator {
    /// Create a locator.
    pub fn new(paths: SidecarPaths, prefer_local: bool, dir_mode: u32) -> Self {
        Self {
            paths,
            prefer_local,
            dir_mode,
        }
    }

    /// Create a locator from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, crate::core::config::ConfigError> {
        Ok(Self::new(
            SidecarPaths::new(config.cache_root()?),
            config.sidecar_local(),
            config.dir_mode(),
        ))
    }

    /// The path routing this locator uses.
    pub fn paths(&self) -> &SidecarPaths {
        &self.paths
    }

    fn absolute(source: &Path) -> PathBuf {
        std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf())
    }

    fn create_dir(&self, dir: &Path) -> Result<(), SidecarError> {
        if dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(self.dir_mode);

        builder.create(dir).map_err(|source| SidecarError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        log::debug!("created sidecar directory {}", dir.display());
        Ok(())
    }
}

impl SidecarLocator for CacheLocator {
    fn find_existing(&self, source: &Path) -> Option<PathBuf> {
        let source = Self::absolute(source);
        self.paths
            .candidates(&source)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    fn find_all(&self, source: &Path) -> Vec<PathBuf> {
        let source = Self::absolute(source);
        self.paths
            .candidates(&source)
            .into_iter()
            .filter(|candidate| candidate.is_file())
            .collect()
    }

    fn allocate_new(&self, source: &Path) -> Result<PathBuf, SidecarError> {
        let source = Self::absolute(source);
        let path = if self.prefer_local {
            self.paths.local_path(&source)
        } else {
            self.paths.cache_path(&source)
        }
        .ok_or_else(|| SidecarError::NoLocation(source.clone()))?;

        if let Some(dir) = path.parent() {
            self.create_dir(dir)?;
        }

        Ok(path)
    }
}
