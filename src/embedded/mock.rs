//! embedded::mock
//!
//! In-memory embedded codec for deterministic testing.
//!
//! # Design
//!
//! Stores are kept per path in memory; the image files themselves are never
//! touched. Unknown paths load as an empty store. Failure scenarios are
//! switched on per instance so tests can exercise the engine's sidecar
//! fallback.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use imgmeta::embedded::{EmbeddedCodec, MockEmbeddedCodec, KEYWORD_KEY};
//!
//! let codec = MockEmbeddedCodec::new();
//! let file = Path::new("/photos/a.jpg");
//!
//! codec.write_item(file, KEYWORD_KEY, Some(&["sun".to_string()])).unwrap();
//! assert_eq!(
//!     codec.read_item(file, KEYWORD_KEY).unwrap(),
//!     Some(vec!["sun".to_string()])
//! );
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CodecError, EmbeddedCodec, EmbeddedStore};

/// Mock codec for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockEmbeddedCodec {
    inner: Arc<Mutex<MockCodecInner>>,
}

#[derive(Debug, Default)]
struct MockCodecInner {
    stores: HashMap<PathBuf, EmbeddedStore>,
    /// Every call fails with `Unavailable`.
    unavailable: bool,
    /// `save` fails with `Rejected`.
    fail_save: bool,
    loads: usize,
    saves: usize,
}

impl MockEmbeddedCodec {
    /// Create an empty mock codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store for `file`.
    pub fn with_store(self, file: impl Into<PathBuf>, store: EmbeddedStore) -> Self {
        self.lock().stores.insert(file.into(), store);
        self
    }

    /// Make every call fail as if embedded metadata were not supported.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Make `save` fail.
    pub fn set_fail_save(&self, fail: bool) {
        self.lock().fail_save = fail;
    }

    /// Current store for `file`, if one was ever seeded or saved.
    pub fn store_for(&self, file: &Path) -> Option<EmbeddedStore> {
        self.lock().stores.get(file).cloned()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Number of `load` calls, failed ones included.
    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    fn lock(&self) -> MutexGuard<'_, MockCodecInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EmbeddedCodec for MockEmbeddedCodec {
    fn load(&self, file: &Path) -> Result<EmbeddedStore, CodecError> {
        let mut inner = self.lock();
        inner.loads += 1;

        if inner.unavailable {
            return Err(CodecError::Unavailable(file.to_path_buf()));
        }

        Ok(inner.stores.get(file).cloned().unwrap_or_default())
    }

    fn save(&self, file: &Path, store: &EmbeddedStore) -> Result<(), CodecError> {
        let mut inner = self.lock();

        if inner.unavailable {
            return Err(CodecError::Unavailable(file.to_path_buf()));
        }
        if inner.fail_save {
            return Err(CodecError::Rejected(format!(
                "mock save failure for {}",
                file.display()
            )));
        }

        inner.stores.insert(file.to_path_buf(), store.clone());
        inner.saves += 1;
        Ok(())
    }
}
