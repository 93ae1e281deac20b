//! embedded::iptc
//!
//! IPTC-IIM records in a JPEG APP13 segment.
//!
//! The segment starts with `Photoshop 3.0\0` followed by `8BIM` resource
//! blocks. Resource `0x0404` holds the raw IIM datasets:
//!
//! ```text
//! 0x1C | record | dataset | length (u16 BE) | data
//! ```
//!
//! A length with bit 15 set is extended: the low 15 bits count the bytes
//! that follow and hold the real length.
//!
//! Records are exposed as [`EmbeddedItem`]s named `Iptc.<Record>.<Dataset>`
//! with the dataset number as tag id. Text is UTF-8 when dataset 1:90
//! declares it (`ESC % G`) and Latin-1 otherwise.
//!
//! The only write supported is replacing the keyword datasets (2:25). Every
//! other dataset and resource is copied through byte for byte, including any
//! trailing bytes the scanner could not make sense of.

use std::borrow::Cow;

use super::EmbeddedItem;

/// Signature that starts a Photoshop APP13 segment.
pub const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";

const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;
const IIM_TAG_MARKER: u8 = 0x1C;
const KEYWORD_RECORD: u8 = 2;
const KEYWORD_DATASET: u8 = 25;
const ENVELOPE_RECORD: u8 = 1;
const CHARSET_DATASET: u8 = 90;
const UTF8_DECLARATION: &[u8] = b"\x1b%G";
const EXTENDED_LENGTH: usize = 0x8000;
/// Widest length-of-length accepted for extended datasets.
const MAX_LENGTH_BYTES: usize = 4;

/// One `8BIM` image resource block.
struct Resource<'a> {
    id: u16,
    /// Pascal-string name including its length byte and padding.
    name: &'a [u8],
    data: &'a [u8],
}

/// One IIM dataset.
struct Dataset<'a> {
    record: u8,
    dataset: u8,
    value: &'a [u8],
    /// Full encoding, header included.
    raw: &'a [u8],
}

/// Result of a scan: what parsed, and the bytes after it.
struct Scan<'a, T> {
    items: Vec<T>,
    tail: &'a [u8],
}

/// Extract IIM datasets from APP13 segment contents.
///
/// Truncated or unexpected data ends the scan; records read before that
/// point are returned.
pub fn parse_app13(segment: &[u8]) -> Vec<EmbeddedItem> {
    let resources = resources(segment).items;
    match resources.iter().find(|r| r.id == IPTC_RESOURCE_ID) {
        Some(resource) => parse_iim(resource.data),
        None => Vec::new(),
    }
}

/// Rebuild APP13 segment contents with the keyword datasets replaced by
/// `keywords`.
///
/// Returns `None` when the segment is not a Photoshop resource segment, or
/// when keywords need a new IPTC resource but unreadable bytes follow the
/// last resource; one appended there would never be found again.
pub fn replace_keywords(segment: &[u8], keywords: &[String]) -> Option<Vec<u8>> {
    if !segment.starts_with(PHOTOSHOP_HEADER) {
        return None;
    }

    let scan = resources(segment);
    let has_iptc = scan.items.iter().any(|r| r.id == IPTC_RESOURCE_ID);
    if !has_iptc && !scan.tail.is_empty() && !keywords.is_empty() {
        log::debug!("APP13 has {} unreadable byte(s), not adding IPTC", scan.tail.len());
        return None;
    }

    let mut out = Vec::with_capacity(segment.len());
    out.extend_from_slice(PHOTOSHOP_HEADER);

    for resource in &scan.items {
        if resource.id == IPTC_RESOURCE_ID {
            let data = rewrite_iim(resource.data, keywords);
            write_resource(&mut out, resource.id, resource.name, &data);
        } else {
            write_resource(&mut out, resource.id, resource.name, resource.data);
        }
    }

    if !has_iptc && !keywords.is_empty() {
        let data = rewrite_iim(&[], keywords);
        write_resource(&mut out, IPTC_RESOURCE_ID, &[0, 0], &data);
    }

    out.extend_from_slice(scan.tail);
    Some(out)
}

/// Split a segment into its resource blocks. Stops at the first block that
/// does not parse.
fn resources(segment: &[u8]) -> Scan<'_, Resource<'_>> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);
    let mut items = Vec::new();
    let mut pos = 0;

    while pos + 12 <= data.len() {
        if &data[pos..pos + 4] != BIM_MARKER {
            break;
        }
        let id = u16::from_be_bytes([data[pos + 4], data[pos + 5]]);

        // Pascal name: length byte + name, padded to an even total
        let name_at = pos + 6;
        let name_total = (data[name_at] as usize + 2) & !1;
        let size_at = name_at + name_total;
        if size_at + 4 > data.len() {
            break;
        }

        let size = u32::from_be_bytes([
            data[size_at],
            data[size_at + 1],
            data[size_at + 2],
            data[size_at + 3],
        ]) as usize;
        let body = size_at + 4;
        let Some(body_end) = body.checked_add(size).filter(|end| *end <= data.len()) else {
            break;
        };

        items.push(Resource {
            id,
            name: &data[name_at..size_at],
            data: &data[body..body_end],
        });

        // Missing pad byte at the very end is tolerated
        pos = (body_end + (size & 1)).min(data.len());
    }

    Scan {
        items,
        tail: &data[pos..],
    }
}

fn write_resource(out: &mut Vec<u8>, id: u16, name: &[u8], data: &[u8]) {
    out.extend_from_slice(BIM_MARKER);
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

/// Split IIM data into datasets. Stops at the first one that does not parse.
fn datasets(data: &[u8]) -> Scan<'_, Dataset<'_>> {
    let mut items = Vec::new();
    let mut pos = 0;

    while let Some((dataset, next)) = dataset_at(data, pos) {
        items.push(dataset);
        pos = next;
    }

    Scan {
        items,
        tail: &data[pos..],
    }
}

/// The dataset starting at `pos`, and the offset just past it.
fn dataset_at(data: &[u8], pos: usize) -> Option<(Dataset<'_>, usize)> {
    let header = data.get(pos..pos + 5)?;
    if header[0] != IIM_TAG_MARKER {
        return None;
    }

    let mut length = u16::from_be_bytes([header[3], header[4]]) as usize;
    let mut body = pos + 5;
    if length & EXTENDED_LENGTH != 0 {
        let count = length & !EXTENDED_LENGTH;
        if count == 0 || count > MAX_LENGTH_BYTES {
            return None;
        }
        let bytes = data.get(body..body + count)?;
        length = bytes.iter().fold(0, |acc, b| (acc << 8) | *b as usize);
        body += count;
    }

    let end = body.checked_add(length).filter(|end| *end <= data.len())?;
    let dataset = Dataset {
        record: header[1],
        dataset: header[2],
        value: &data[body..end],
        raw: &data[pos..end],
    };
    Some((dataset, end))
}

fn declares_utf8(datasets: &[Dataset<'_>]) -> bool {
    datasets.iter().any(|d| {
        d.record == ENVELOPE_RECORD && d.dataset == CHARSET_DATASET && d.value == UTF8_DECLARATION
    })
}

fn decode(value: &[u8], utf8: bool) -> String {
    if utf8 {
        String::from_utf8_lossy(value).into_owned()
    } else {
        value.iter().map(|b| *b as char).collect()
    }
}

/// Latin-1 bytes of `text`, or `None` if a character is out of range.
fn encode_latin1(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

fn parse_iim(data: &[u8]) -> Vec<EmbeddedItem> {
    let datasets = datasets(data).items;
    let utf8 = declares_utf8(&datasets);

    datasets
        .iter()
        .map(|d| {
            EmbeddedItem::new(
                d.dataset as u16,
                dataset_name(d.record, d.dataset),
                vec![decode(d.value, utf8)],
            )
        })
        .collect()
}

/// Encoded keyword values for an IIM block, and whether a UTF-8
/// declaration has to be added for them.
fn encode_keywords<'a>(keywords: &'a [String], existing: &[Dataset<'_>]) -> (Vec<Cow<'a, [u8]>>, bool) {
    if declares_utf8(existing) {
        return (keywords.iter().map(|k| Cow::Borrowed(k.as_bytes())).collect(), false);
    }

    let latin1: Option<Vec<Vec<u8>>> = keywords.iter().map(|k| encode_latin1(k)).collect();
    if let Some(encoded) = latin1 {
        return (encoded.into_iter().map(Cow::Owned).collect(), false);
    }

    // Switching to UTF-8 is only safe when nothing else depends on the
    // current character set.
    let declared = existing
        .iter()
        .any(|d| d.record == ENVELOPE_RECORD && d.dataset == CHARSET_DATASET);
    let other_text_ascii = existing
        .iter()
        .filter(|d| !(d.record == KEYWORD_RECORD && d.dataset == KEYWORD_DATASET))
        .all(|d| d.value.is_ascii());
    if !declared && other_text_ascii {
        return (keywords.iter().map(|k| Cow::Borrowed(k.as_bytes())).collect(), true);
    }

    let kept = keywords
        .iter()
        .filter_map(|k| {
            let encoded = encode_latin1(k);
            if encoded.is_none() {
                log::warn!("IPTC character set cannot hold keyword {:?}, skipping it", k);
            }
            encoded.map(Cow::Owned)
        })
        .collect();
    (kept, false)
}

fn rewrite_iim(data: &[u8], keywords: &[String]) -> Vec<u8> {
    let scan = datasets(data);
    let (encoded, declare_utf8) = encode_keywords(keywords, &scan.items);
    let mut out = Vec::with_capacity(data.len());

    if declare_utf8 {
        push_dataset(&mut out, ENVELOPE_RECORD, CHARSET_DATASET, UTF8_DECLARATION);
    }

    // Keywords go before the first dataset of a later record
    let mut pending = Some(encoded);
    for dataset in &scan.items {
        if dataset.record == KEYWORD_RECORD && dataset.dataset == KEYWORD_DATASET {
            continue;
        }
        if dataset.record > KEYWORD_RECORD {
            if let Some(values) = pending.take() {
                push_keywords(&mut out, &values);
            }
        }
        out.extend_from_slice(dataset.raw);
    }
    if let Some(values) = pending.take() {
        push_keywords(&mut out, &values);
    }

    out.extend_from_slice(scan.tail);
    out
}

fn push_keywords(out: &mut Vec<u8>, values: &[Cow<'_, [u8]>]) {
    for value in values {
        if value.len() >= EXTENDED_LENGTH {
            log::warn!("skipping oversized IPTC keyword ({} bytes)", value.len());
            continue;
        }
        push_dataset(out, KEYWORD_RECORD, KEYWORD_DATASET, value);
    }
}

fn push_dataset(out: &mut Vec<u8>, record: u8, dataset: u8, value: &[u8]) {
    out.extend_from_slice(&[IIM_TAG_MARKER, record, dataset]);
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value);
}

/// Qualified item name for an IIM record/dataset pair.
pub fn dataset_name(record: u8, dataset: u8) -> String {
    let group = match record {
        1 => "Envelope",
        2 => "Application2",
        _ => return format!("Iptc.Record{}.0x{:04x}", record, dataset),
    };

    let tag = match (record, dataset) {
        (2, 0) => "RecordVersion",
        (2, 5) => "ObjectName",
        (2, 25) => "Keywords",
        (2, 80) => "Byline",
        (2, 90) => "City",
        (2, 101) => "CountryName",
        (2, 105) => "Headline",
        (2, 116) => "Copyright",
        (2, 120) => "Caption",
        _ => return format!("Iptc.{}.0x{:04x}", group, dataset),
    };

    format!("Iptc.{}.{}", group, tag)
}
