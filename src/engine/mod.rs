//! engine
//!
//! Reads, writes and updates image metadata across both backends.
//!
//! # Architecture
//!
//! The engine sits on top of two independent stores:
//!
//! 1. **Embedded**: items inside the image file, through an [`EmbeddedCodec`]
//! 2. **Sidecar**: a `.gqv` text file, found or allocated by a [`SidecarLocator`]
//!
//! ```text
//! read:  embedded ─┐
//!                  ├─ merge ─> MetadataRecord
//!        sidecar  ─┘
//!
//! write: embedded (if enabled) ─ ok ─> delete stale sidecar
//!                               └ err ─> sidecar
//!
//! set:   read ─> replace/append ─> write
//! ```
//!
//! # Invariants
//!
//! - A failing backend never fails a read; it only contributes nothing
//! - Embedded writes are attempted only when `save_in_image_file` is set
//! - After a successful embedded write no sidecar remains for the file
//! - Sidecar writes are atomic; a failed write leaves the old file in place
//! - Nothing is cached between calls
//!
//! # Example
//!
//! ```
//! use imgmeta::core::config::Config;
//! use imgmeta::core::paths::SidecarPaths;
//! use imgmeta::embedded::MockEmbeddedCodec;
//! use imgmeta::engine::MetadataEngine;
//! use imgmeta::sidecar::CacheLocator;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let image = temp.path().join("a.jpg");
//! std::fs::write(&image, b"").unwrap();
//!
//! let codec = MockEmbeddedCodec::new();
//! let locator = CacheLocator::new(SidecarPaths::new(temp.path().join("cache")), false, 0o755);
//! let config = Config::default();
//! let engine = MetadataEngine::new(&codec, &locator, &config);
//!
//! assert!(engine.write(&image, &["sun".to_string()], Some("nice day")));
//! let record = engine.read(&image).unwrap();
//! assert_eq!(record.keywords.as_slice(), &["sun"]);
//! assert_eq!(record.comment.as_deref(), Some("nice day\n"));
//! ```

pub mod merge;
pub mod sources;

pub use merge::SourceRead;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::Config;
use crate::core::keywords::merge_unique;
use crate::core::types::{KeywordList, MetadataRecord, ReadScope};
use crate::embedded::{CodecError, EmbeddedCodec};
use crate::sidecar::{format, SidecarError, SidecarLocator};

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Neither backend holds the requested data.
    #[error("no metadata found for {0}")]
    NotFound(PathBuf),

    /// The sidecar could not be located, read or written.
    #[error(transparent)]
    Io(#[from] SidecarError),

    /// The embedded backend is unavailable or refused the data.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Where a successful write ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// Stored inside the image file.
    Embedded,
    /// Stored in the sidecar at this path.
    Sidecar(PathBuf),
}

/// Metadata engine over an embedded codec and a sidecar locator.
///
/// Borrows its collaborators; constructing one is free.
pub struct MetadataEngine<'a> {
    embedded: &'a dyn EmbeddedCodec,
    locator: &'a dyn SidecarLocator,
    config: &'a Config,
}

impl<'a> MetadataEngine<'a> {
    /// Create an engine.
    pub fn new(
        embedded: &'a dyn EmbeddedCodec,
        locator: &'a dyn SidecarLocator,
        config: &'a Config,
    ) -> Self {
        Self {
            embedded,
            locator,
            config,
        }
    }

    /// Read keywords and comment, merged from both backends.
    pub fn read(&self, file: &Path) -> Result<MetadataRecord, MetadataError> {
        self.read_scoped(file, ReadScope::Both)
    }

    /// Read the requested part of the metadata.
    ///
    /// Parts outside `scope` are left empty in the result.
    ///
    /// # Errors
    ///
    /// [`MetadataError::NotFound`] when neither backend produced data or the
    /// requested part is absent.
    pub fn read_scoped(
        &self,
        file: &Path,
        scope: ReadScope,
    ) -> Result<MetadataRecord, MetadataError> {
        let embedded = sources::read_embedded(self.embedded, file);
        let sidecar = sources::read_sidecar(self.locator, file);

        let merged = merge::merge(&embedded, &sidecar)
            .ok_or_else(|| MetadataError::NotFound(file.to_path_buf()))?;

        let keywords = if scope.wants_keywords() {
            merged.keywords
        } else {
            KeywordList::new()
        };
        let comment = if scope.wants_comment() {
            merged.comment
        } else {
            None
        };
        let record = MetadataRecord::new(keywords, comment);

        let has_keywords = !record.keywords.is_empty();
        let has_comment = record.non_empty_comment().is_some();
        let missing = match scope {
            ReadScope::Keywords => !has_keywords,
            ReadScope::Comment => !has_comment,
            ReadScope::Both => !has_keywords && !has_comment,
        };
        if missing {
            return Err(MetadataError::NotFound(file.to_path_buf()));
        }

        Ok(record)
    }

    /// Write keywords and comment, reporting only success or failure.
    ///
    /// The reason for any failure is logged.
    pub fn write(&self, file: &Path, keywords: &[String], comment: Option<&str>) -> bool {
        match self.try_write(file, keywords, comment) {
            Ok(target) => {
                log::debug!("metadata for {} written to {:?}", file.display(), target);
                true
            }
            Err(e) => {
                log::warn!("failed to write metadata for {}: {}", file.display(), e);
                false
            }
        }
    }

    /// Write keywords and comment.
    ///
    /// Embedded metadata is tried first when enabled. On success any stale
    /// sidecar is deleted; on failure the sidecar is written instead.
    pub fn try_write(
        &self,
        file: &Path,
        keywords: &[String],
        comment: Option<&str>,
    ) -> Result<WriteTarget, MetadataError> {
        if self.config.save_in_image_file() {
            match self.write_embedded(file, keywords, comment) {
                Ok(()) => {
                    self.delete_sidecars(file);
                    return Ok(WriteTarget::Embedded);
                }
                Err(e) => {
                    log::info!(
                        "embedded write failed for {}, using sidecar: {}",
                        file.display(),
                        e
                    );
                }
            }
        }

        self.write_sidecar(file, keywords, comment)
            .map(WriteTarget::Sidecar)
    }

    /// Write only the embedded metadata, regardless of configuration.
    pub fn write_embedded(
        &self,
        file: &Path,
        keywords: &[String],
        comment: Option<&str>,
    ) -> Result<(), MetadataError> {
        sources::write_embedded(self.embedded, file, keywords, comment)?;
        Ok(())
    }

    /// Write only the sidecar. Returns the sidecar path.
    ///
    /// An existing sidecar is rewritten in place when writable; otherwise a
    /// new location is allocated.
    pub fn write_sidecar(
        &self,
        file: &Path,
        keywords: &[String],
        comment: Option<&str>,
    ) -> Result<PathBuf, MetadataError> {
        let path = match self.locator.find_existing(file) {
            Some(existing) if self.locator.is_writable(&existing) => existing,
            Some(existing) => {
                log::debug!("sidecar {} is read-only, allocating anew", existing.display());
                self.locator.allocate_new(file)?
            }
            None => self.locator.allocate_new(file)?,
        };

        format::serialize(&path, keywords, comment)?;
        log::debug!("wrote sidecar {}", path.display());
        Ok(path)
    }

    /// Remove every sidecar of `file`, local and cached.
    fn delete_sidecars(&self, file: &Path) {
        for path in self.locator.find_all(file) {
            match self.locator.remove(&path) {
                Ok(()) => log::debug!("removed migrated sidecar {}", path.display()),
                Err(e) => log::warn!("could not remove stale sidecar: {}", e),
            }
        }
    }

    /// Update keywords and/or comment.
    ///
    /// `None` leaves that part as it is. With `append` the new comment is
    /// concatenated onto an existing non-empty comment, with no separator,
    /// and new keywords are added after the existing ones unless already
    /// present. Without `append` the new values replace the old.
    ///
    /// Write failures are logged, not returned.
    pub fn set(
        &self,
        file: &Path,
        keywords: Option<&[String]>,
        comment: Option<&str>,
        append: bool,
    ) {
        let current = match self.read(file) {
            Ok(record) => record,
            Err(MetadataError::NotFound(_)) => MetadataRecord::default(),
            Err(e) => {
                log::debug!("reading current metadata failed: {}", e);
                MetadataRecord::default()
            }
        };
        let next = apply_update(current, keywords, comment, append);

        self.write(file, next.keywords.as_slice(), next.comment.as_deref());
    }
}

/// The record `set` writes, given the current one.
pub fn apply_update(
    current: MetadataRecord,
    keywords: Option<&[String]>,
    comment: Option<&str>,
    append: bool,
) -> MetadataRecord {
    let comment = match comment {
        Some(new) => match current.non_empty_comment() {
            Some(old) if append => Some(format!("{}{}", old, new)),
            _ => Some(new.to_string()),
        },
        None => current.comment.clone(),
    };

    let keywords = match keywords {
        Some(new) if append && !current.keywords.is_empty() => {
            merge_unique(current.keywords.as_slice(), new)
        }
        Some(new) => new.iter().cloned().collect(),
        None => current.keywords,
    };

    MetadataRecord::new(keywords, comment)
}
