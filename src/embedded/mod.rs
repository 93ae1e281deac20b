//! embedded
//!
//! Metadata stored inside the image file.
//!
//! # Modules
//!
//! - [`jpeg`] - JPEG codec (XMP in APP1, IPTC-IIM in APP13)
//! - [`xmp`] - XMP packet reading and rewriting
//! - [`iptc`] - IPTC-IIM record reading and keyword rewriting
//! - [`mock`] - In-memory codec for tests
//!
//! # Item Model
//!
//! A codec loads an image's embedded metadata into an [`EmbeddedStore`]: an
//! ordered list of named items, each carrying a tag id and one or more
//! string values. Names follow the `Family.Group.Tag` convention
//! (`Xmp.dc.subject`, `Iptc.Application2.Keywords`). Items with the same
//! name may repeat; IPTC stores one item per keyword.
//!
//! The engine only touches two items, [`COMMENT_KEY`] and [`KEYWORD_KEY`],
//! plus a read-only scan for [`LEGACY_KEYWORD_NAME`].

pub mod iptc;
pub mod jpeg;
pub mod mock;
pub mod xmp;

pub use jpeg::JpegXmpCodec;
pub use mock::MockEmbeddedCodec;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::durable::DurableWriteError;

/// Item holding the free-text comment.
pub const COMMENT_KEY: &str = "Xmp.dc.description";

/// Item holding the keyword list.
pub const KEYWORD_KEY: &str = "Xmp.dc.subject";

/// Tag id of IPTC keyword records (dataset 2:25).
pub const LEGACY_KEYWORD_TAG: u16 = 0x0019;

/// Item name of IPTC keyword records.
pub const LEGACY_KEYWORD_NAME: &str = "Iptc.Application2.Keywords";

/// Errors from embedded metadata codecs.
///
/// None of these are fatal to the engine: a failing codec makes it fall
/// back to sidecar files.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Embedded metadata is not available for this file.
    #[error("embedded metadata unavailable for {0}")]
    Unavailable(PathBuf),

    /// The file format is not handled by this codec.
    #[error("unsupported image format: {0}")]
    Unsupported(PathBuf),

    /// The file could not be parsed.
    #[error("malformed image {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// The codec refused to store the metadata.
    #[error("embedded metadata rejected: {0}")]
    Rejected(String),

    /// Reading the image failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the image failed; the original file is untouched.
    #[error(transparent)]
    Write(#[from] DurableWriteError),
}

/// One named metadata item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedItem {
    /// Numeric tag id within its family (0 for XMP properties).
    pub tag_id: u16,
    /// Qualified item name, e.g. `Xmp.dc.subject`.
    pub name: String,
    /// Item values; single-valued items hold one element.
    pub values: Vec<String>,
}

impl EmbeddedItem {
    /// Create an item.
    pub fn new(tag_id: u16, name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            tag_id,
            name: name.into(),
            values,
        }
    }

    /// The item's values joined as text, or `None` if it has none.
    pub fn as_text(&self) -> Option<String> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.join(" "))
        }
    }
}

/// In-memory view of an image's embedded metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedStore {
    items: Vec<EmbeddedItem>,
}

impl EmbeddedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All items in file order.
    pub fn items(&self) -> &[EmbeddedItem] {
        &self.items
    }

    /// The first item called `name`.
    pub fn get(&self, name: &str) -> Option<&EmbeddedItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Values of the first item called `name`.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|item| item.values.as_slice())
    }

    /// Append an item, keeping any existing items with the same name.
    pub fn push(&mut self, item: EmbeddedItem) {
        self.items.push(item);
    }

    /// Replace every item called `name` with a single item holding `values`.
    pub fn set(&mut self, name: &str, values: Vec<String>) {
        match self.items.iter().position(|item| item.name == name) {
            Some(pos) => {
                self.items[pos].values = values;
                let mut seen = 0usize;
                self.items.retain(|item| {
                    if item.name != name {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.items.push(EmbeddedItem::new(0, name, values)),
        }
    }

    /// Remove every item called `name`. Returns whether any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.name != name);
        self.items.len() != before
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read/write access to embedded metadata.
///
/// `load` and `save` work on the whole store so a write touches the file
/// once. `read_item` and `write_item` are conveniences built on top.
pub trait EmbeddedCodec {
    /// Load the embedded metadata of `file`.
    fn load(&self, file: &Path) -> Result<EmbeddedStore, CodecError>;

    /// Store `store` back into `file`.
    fn save(&self, file: &Path, store: &EmbeddedStore) -> Result<(), CodecError>;

    /// Values of one item, or `None` if the item is absent.
    fn read_item(&self, file: &Path, key: &str) -> Result<Option<Vec<String>>, CodecError> {
        Ok(self.load(file)?.values(key).map(<[String]>::to_vec))
    }

    /// Set (`Some`) or remove (`None`) one item and save.
    fn write_item(
        &self,
        file: &Path,
        key: &str,
        values: Option<&[String]>,
    ) -> Result<(), CodecError> {
        let mut store = self.load(file)?;
        match values {
            Some(values) => store.set(key, values.to_vec()),
            None => {
                store.remove(key);
            }
        }
        self.save(file, &store)
    }
}
