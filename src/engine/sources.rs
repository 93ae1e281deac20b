//! engine::sources
//!
//! Per-backend reads and writes.
//!
//! Each read turns one backend into a [`SourceRead`]; failures become
//! `SourceRead::Failed` and never abort the overall read.

use std::path::Path;

use super::merge::SourceRead;
use crate::core::types::{KeywordList, MetadataRecord};
use crate::embedded::{
    CodecError, EmbeddedCodec, EmbeddedItem, COMMENT_KEY, KEYWORD_KEY, LEGACY_KEYWORD_NAME,
    LEGACY_KEYWORD_TAG,
};
use crate::sidecar::{format, SidecarLocator};

/// Read keywords and comment from embedded metadata.
///
/// Counts as found only when a non-empty comment or at least one keyword
/// is present.
pub fn read_embedded(codec: &dyn EmbeddedCodec, file: &Path) -> SourceRead {
    let store = match codec.load(file) {
        Ok(store) => store,
        Err(e) => {
            log::debug!("embedded read skipped for {}: {}", file.display(), e);
            return SourceRead::Failed(e.to_string());
        }
    };

    let comment = store
        .values(COMMENT_KEY)
        .and_then(|values| values.first())
        .cloned();

    let mut keywords: KeywordList = store
        .values(KEYWORD_KEY)
        .unwrap_or(&[])
        .iter()
        .cloned()
        .collect();

    // IPTC keywords repeat one item per keyword, so a lookup by name only
    // sees the first. Walk every item instead.
    for item in store.items() {
        if item.tag_id == LEGACY_KEYWORD_TAG && item.name == LEGACY_KEYWORD_NAME {
            if let Some(text) = item.as_text() {
                keywords.push(text);
            }
        }
    }

    let record = MetadataRecord::new(keywords, comment);
    if record.is_empty() {
        SourceRead::Absent
    } else {
        SourceRead::Found(record)
    }
}

/// Read the sidecar for `file`, if one exists.
pub fn read_sidecar(locator: &dyn SidecarLocator, file: &Path) -> SourceRead {
    let Some(path) = locator.find_existing(file) else {
        return SourceRead::Absent;
    };

    match format::parse(&path) {
        Ok(record) => SourceRead::Found(record),
        Err(e) => {
            log::warn!("{}", e);
            SourceRead::Failed(e.to_string())
        }
    }
}

/// Store keywords and comment in embedded metadata.
///
/// An empty comment removes the comment item; an empty keyword list removes
/// the keyword item. IPTC keyword records already present are replaced by
/// the new list.
pub fn write_embedded(
    codec: &dyn EmbeddedCodec,
    file: &Path,
    keywords: &[String],
    comment: Option<&str>,
) -> Result<(), CodecError> {
    let mut store = codec.load(file)?;

    match comment.filter(|c| !c.is_empty()) {
        Some(text) => store.set(COMMENT_KEY, vec![text.to_string()]),
        None => {
            store.remove(COMMENT_KEY);
        }
    }

    store.remove(KEYWORD_KEY);
    if !keywords.is_empty() {
        store.set(KEYWORD_KEY, keywords.to_vec());
    }

    if store.remove(LEGACY_KEYWORD_NAME) {
        for keyword in keywords {
            store.push(EmbeddedItem::new(
                LEGACY_KEYWORD_TAG,
                LEGACY_KEYWORD_NAME,
                vec![keyword.clone()],
            ));
        }
    }

    codec.save(file, &store)
}
