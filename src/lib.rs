//! imgmeta - Keywords and comments for image files
//!
//! imgmeta attaches user-authored metadata (a keyword list and a free-text
//! comment) to images. The metadata lives in one of two places: inside the
//! image file (XMP, with IPTC keywords read for compatibility) or in a
//! `.gqv` sidecar text file kept next to the image or in a cache directory.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Reads, merges and writes metadata across both backends
//! - [`sidecar`] - Sidecar text format and sidecar locations
//! - [`embedded`] - Embedded metadata codecs
//! - [`core`] - Domain types, keyword operations, configuration, durable writes
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. A broken or unreadable backend never fails a read that the other
//!    backend can satisfy
//! 2. Sidecar and image writes are atomic; a failed write leaves the previous
//!    file intact
//! 3. After a successful embedded write no stale sidecar remains
//! 4. Keyword lists never hold empty or duplicate entries

pub mod cli;
pub mod core;
pub mod embedded;
pub mod engine;
pub mod sidecar;
pub mod ui;
