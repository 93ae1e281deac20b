//! core::durable
//!
//! Scoped durable file writes.
//!
//! A [`ScopedWrite`] stages content in a temporary file next to the target
//! and only replaces the target on [`ScopedWrite::commit`]. Dropping the
//! writer (or calling [`ScopedWrite::abort`]) discards the staged content and
//! leaves any existing target untouched, so readers never observe a
//! half-written file.
//!
//! # Example
//!
//! ```no_run
//! use imgmeta::core::durable::ScopedWrite;
//! use std::path::Path;
//!
//! let mut out = ScopedWrite::open(Path::new("/tmp/photo.jpg.gqv"))?;
//! out.append("[keywords]\n")?;
//! out.append("sun\n")?;
//! out.commit()?;
//! # Ok::<(), imgmeta::core::durable::DurableWriteError>(())
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tempfile::NamedTempFile;
use thiserror::Error;

/// Mode applied to files that did not exist before the write.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Errors from scoped durable writes.
#[derive(Debug, Error)]
pub enum DurableWriteError {
    #[error("cannot create temporary file for '{path}': {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("cannot write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot commit '{path}': {source}")]
    Commit { path: PathBuf, source: io::Error },
}

/// A write that becomes visible atomically on commit.
///
/// The staged temp file lives in the same directory as the target so the
/// final rename never crosses filesystems.
#[derive(Debug)]
pub struct ScopedWrite {
    target: PathBuf,
    staged: NamedTempFile,
}

impl ScopedWrite {
    /// Start a write that will replace `target` on commit.
    ///
    /// If `target` is a symlink the write goes to the file it points at.
    /// The parent directory must already exist.
    pub fn open(target: &Path) -> Result<Self, DurableWriteError> {
        let target = resolve_symlink(target);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let staged = NamedTempFile::new_in(&dir).map_err(|source| DurableWriteError::Create {
            path: target.clone(),
            source,
        })?;

        Ok(Self { target, staged })
    }

    /// The path that will be replaced on commit.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Append text to the staged content.
    pub fn append(&mut self, text: &str) -> Result<(), DurableWriteError> {
        self.append_bytes(text.as_bytes())
    }

    /// Append raw bytes to the staged content.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), DurableWriteError> {
        self.staged
            .write_all(bytes)
            .map_err(|source| DurableWriteError::Write {
                path: self.target.clone(),
                source,
            })
    }

    /// Flush, sync and atomically move the staged content onto the target.
    pub fn commit(mut self) -> Result<(), DurableWriteError> {
        let target = self.target.clone();
        let commit_err = |source| DurableWriteError::Commit {
            path: target.clone(),
            source,
        };

        self.staged.flush().map_err(commit_err)?;
        apply_permissions(&self.staged, &self.target).map_err(commit_err)?;
        self.staged.as_file().sync_all().map_err(commit_err)?;

        self.staged
            .persist(&self.target)
            .map_err(|e| commit_err(e.error))?;

        Ok(())
    }

    /// Discard the staged content. The target is left as it was.
    pub fn abort(self) {
        log::debug!("discarding staged write for {}", self.target.display());
    }
}

fn resolve_symlink(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Give the staged file the permissions of the file it replaces, or the
/// default mode for new files.
#[cfg(unix)]
fn apply_permissions(staged: &NamedTempFile, target: &Path) -> io::Result<()> {
    let mode = match fs::metadata(target) {
        Ok(meta) => meta.permissions().mode() & 0o7777,
        Err(_) => NEW_FILE_MODE,
    };
    staged
        .as_file()
        .set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_permissions(_staged: &NamedTempFile, _target: &Path) -> io::Result<()> {
    Ok(())
}

impl Write for ScopedWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staged.flush()
    }
}
