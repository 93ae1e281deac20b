//! embedded::jpeg
//!
//! Embedded metadata codec for JPEG files.
//!
//! # Layout
//!
//! - XMP lives in an APP1 segment starting with [`XMP_HEADER`]
//! - IPTC-IIM lives in an APP13 segment starting with [`PHOTOSHOP_HEADER`]
//!
//! All other segments are carried through a save untouched. Saves go through
//! [`ScopedWrite`], so a failed save leaves the original image in place.

use std::fs;
use std::path::Path;

use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::Bytes;

use super::iptc::{self, PHOTOSHOP_HEADER};
use super::xmp::{self, XMP_HEADER};
use super::{
    CodecError, EmbeddedCodec, EmbeddedItem, EmbeddedStore, COMMENT_KEY, KEYWORD_KEY,
    LEGACY_KEYWORD_NAME,
};
use crate::core::durable::ScopedWrite;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP1: u8 = 0xE1;
const APP13: u8 = 0xED;
const EXIF_PREFIX: &[u8] = b"Exif\0\0";

/// Largest segment payload: the u16 length field counts itself.
const MAX_SEGMENT_CONTENTS: usize = 0xFFFF - 2;

/// XMP/IPTC codec for JPEG images.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegXmpCodec;

impl JpegXmpCodec {
    /// Create a codec.
    pub fn new() -> Self {
        Self
    }

    fn read_jpeg(file: &Path) -> Result<Jpeg, CodecError> {
        let bytes = fs::read(file).map_err(|source| CodecError::Io {
            path: file.to_path_buf(),
            source,
        })?;

        if !bytes.starts_with(&SOI) {
            return Err(CodecError::Unsupported(file.to_path_buf()));
        }

        Jpeg::from_bytes(Bytes::from(bytes)).map_err(|e| CodecError::Malformed {
            path: file.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl EmbeddedCodec for JpegXmpCodec {
    fn load(&self, file: &Path) -> Result<EmbeddedStore, CodecError> {
        let jpeg = Self::read_jpeg(file)?;
        let mut store = EmbeddedStore::new();

        if let Some(pos) = find_xmp(jpeg.segments()) {
            let packet = &jpeg.segments()[pos].contents()[XMP_HEADER.len()..];
            let dc = xmp::parse_packet(packet);

            if let Some(description) = dc.description {
                store.push(EmbeddedItem::new(0, COMMENT_KEY, vec![description]));
            }
            if !dc.subject.is_empty() {
                store.push(EmbeddedItem::new(0, KEYWORD_KEY, dc.subject));
            }
        }

        for segment in jpeg.segments() {
            if segment.marker() == APP13 && segment.contents().starts_with(PHOTOSHOP_HEADER) {
                for item in iptc::parse_app13(segment.contents()) {
                    store.push(item);
                }
            }
        }

        log::debug!(
            "loaded {} embedded item(s) from {}",
            store.items().len(),
            file.display()
        );
        Ok(store)
    }

    fn save(&self, file: &Path, store: &EmbeddedStore) -> Result<(), CodecError> {
        let mut jpeg = Self::read_jpeg(file)?;

        let description = store
            .values(COMMENT_KEY)
            .and_then(|values| values.first())
            .map(String::as_str);
        let subject = store.values(KEYWORD_KEY).unwrap_or(&[]);

        let mut changed = update_xmp(&mut jpeg, description, subject)?;

        let legacy: Vec<String> = store
            .items()
            .iter()
            .filter(|item| item.name == LEGACY_KEYWORD_NAME)
            .flat_map(|item| item.values.iter().cloned())
            .collect();
        changed |= update_iptc(&mut jpeg, &legacy)?;

        if !changed {
            log::debug!("no embedded metadata to store in {}", file.display());
            return Ok(());
        }

        let mut out = ScopedWrite::open(file)?;
        out.append_bytes(&jpeg.encoder().bytes())?;
        out.commit()?;

        log::debug!("saved embedded metadata to {}", file.display());
        Ok(())
    }
}

fn find_xmp(segments: &[JpegSegment]) -> Option<usize> {
    segments
        .iter()
        .position(|s| s.marker() == APP1 && s.contents().starts_with(XMP_HEADER))
}

fn find_exif(segments: &[JpegSegment]) -> Option<usize> {
    segments
        .iter()
        .position(|s| s.marker() == APP1 && s.contents().starts_with(EXIF_PREFIX))
}

/// Index just past the APPn segments at the start of the file.
fn after_app_segments(segments: &[JpegSegment]) -> usize {
    segments
        .iter()
        .take_while(|s| (0xE0..=0xEF).contains(&s.marker()))
        .count()
}

/// Rewrite or insert the XMP segment. Returns whether the file changed.
fn update_xmp(
    jpeg: &mut Jpeg,
    description: Option<&str>,
    subject: &[String],
) -> Result<bool, CodecError> {
    let pos = find_xmp(jpeg.segments());

    // Nothing to store and nothing to clear
    if pos.is_none() && description.map_or(true, str::is_empty) && subject.is_empty() {
        return Ok(false);
    }

    let existing = pos.map(|pos| {
        let packet = &jpeg.segments()[pos].contents()[XMP_HEADER.len()..];
        String::from_utf8_lossy(packet).into_owned()
    });
    let packet = xmp::update_packet(existing.as_deref(), description, subject);

    let mut contents = Vec::with_capacity(XMP_HEADER.len() + packet.len());
    contents.extend_from_slice(XMP_HEADER);
    contents.extend_from_slice(packet.as_bytes());
    if contents.len() > MAX_SEGMENT_CONTENTS {
        return Err(CodecError::Rejected(format!(
            "XMP packet of {} bytes does not fit in one segment",
            contents.len()
        )));
    }

    let segment = JpegSegment::new_with_contents(APP1, Bytes::from(contents));
    let segments = jpeg.segments_mut();
    match pos {
        Some(pos) => segments[pos] = segment,
        None => {
            let at = match find_exif(segments) {
                Some(exif) => exif + 1,
                None => after_app_segments(segments),
            };
            segments.insert(at, segment);
        }
    }

    Ok(true)
}

/// Replace the keyword records of an existing IPTC block. Returns whether
/// the file changed.
fn update_iptc(jpeg: &mut Jpeg, keywords: &[String]) -> Result<bool, CodecError> {
    let Some(pos) = jpeg
        .segments()
        .iter()
        .position(|s| s.marker() == APP13 && s.contents().starts_with(PHOTOSHOP_HEADER))
    else {
        return Ok(false);
    };

    let Some(contents) = iptc::replace_keywords(jpeg.segments()[pos].contents(), keywords) else {
        return Ok(false);
    };
    if contents[..] == jpeg.segments()[pos].contents()[..] {
        return Ok(false);
    }
    if contents.len() > MAX_SEGMENT_CONTENTS {
        return Err(CodecError::Rejected(format!(
            "IPTC block of {} bytes does not fit in one segment",
            contents.len()
        )));
    }

    jpeg.segments_mut()[pos] = JpegSegment::new_with_contents(APP13, Bytes::from(contents));
    Ok(true)
}
