//! sidecar
//!
//! Legacy sidecar files: the text format and where the files live.
//!
//! # Modules
//!
//! - [`format`] - Parse and serialize the sidecar text format
//! - [`locator`] - Find or allocate the sidecar path for an image
//!
//! # Design
//!
//! The engine never computes sidecar paths itself. It asks a
//! [`SidecarLocator`] for an existing sidecar (reads, deletes) or a fresh
//! writable location (writes). Tests substitute their own locator.

pub mod format;
pub mod locator;

pub use locator::{CacheLocator, SidecarLocator};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::durable::DurableWriteError;

/// Errors from sidecar operations.
#[derive(Debug, Error)]
pub enum SidecarError {
    /// The sidecar file could not be opened.
    #[error("sidecar not found: {path}: {source}")]
    NotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A directory or file operation on the sidecar location failed.
    #[error("sidecar I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No sidecar location can be derived for the image path.
    #[error("no sidecar location for {0}")]
    NoLocation(PathBuf),

    /// The text would read back differently, e.g. a keyword starting with
    /// `#` or `[`. Nothing was written.
    #[error("cannot store {0:?} in a sidecar")]
    Unrepresentable(String),

    /// Writing the sidecar failed; the previous file is untouched.
    #[error("failed to write sidecar: {0}")]
    Write(#[from] DurableWriteError),
}
