//! core::keywords
//!
//! Keyword list utilities: free-text tokenization, membership, and
//! order-preserving merges.
//!
//! All functions are total. Nothing here can fail; degenerate input yields
//! an empty list.
//!
//! # Example
//!
//! ```
//! use imgmeta::core::keywords::{merge_unique, tokenize};
//!
//! let typed = tokenize("sun, beach;sun\n sea");
//! assert_eq!(typed.as_slice(), &["sun", "beach", "sea"]);
//!
//! let merged = merge_unique(typed.as_slice(), &["sea".to_string(), "dunes".to_string()]);
//! assert_eq!(merged.as_slice(), &["sun", "beach", "sea", "dunes"]);
//! ```

use super::types::KeywordList;

/// Characters that split free text into keywords.
pub const KEYWORD_SEPARATORS: &[char] = &[',', ';', '\n', '\r', '\u{8}'];

fn is_separator(c: char) -> bool {
    KEYWORD_SEPARATORS.contains(&c)
}

// ASCII whitespace including vertical tab, which `char::is_ascii_whitespace`
// leaves out.
fn is_trim_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\u{b}'
}

/// Split free text into a de-duplicated keyword list.
///
/// Tokens are separated by any of [`KEYWORD_SEPARATORS`], trimmed of
/// surrounding ASCII whitespace, and dropped when empty. Only the first
/// occurrence of each token is kept.
pub fn tokenize(text: &str) -> KeywordList {
    text.split(is_separator)
        .map(|token| token.trim_matches(is_trim_space))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Check whether `keyword` occurs in `list` (exact match).
///
/// An absent keyword is never found.
pub fn contains(list: &[String], keyword: Option<&str>) -> bool {
    match keyword {
        Some(needle) => list.iter().any(|k| k == needle),
        None => false,
    }
}

/// Append the elements of `extra` that are not yet in `base`.
///
/// `base` keeps its order; new elements follow in the order they appear in
/// `extra`.
pub fn merge_unique(base: &[String], extra: &[String]) -> KeywordList {
    base.iter().chain(extra.iter()).cloned().collect()
}

/// Remove repeats from a concatenated list, keeping first occurrences.
pub fn dedup_preserve_order(list: Vec<String>) -> KeywordList {
    list.into_iter().collect()
}
