//! core
//!
//! Core domain types and building blocks for imgmeta.
//!
//! # Modules
//!
//! - [`types`] - `KeywordList`, `MetadataRecord`, `ReadScope`
//! - [`keywords`] - Tokenization, membership and order-preserving merges
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Sidecar path routing
//! - [`durable`] - Scoped atomic file writes
//!
//! # Design Principles
//!
//! - Keyword lists are duplicate-free by construction
//! - Schemas are strict and self-describing
//! - Nothing here knows about image formats

pub mod config;
pub mod durable;
pub mod keywords;
pub mod paths;
pub mod types;
