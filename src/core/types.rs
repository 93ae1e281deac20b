//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`KeywordList`] - Ordered, duplicate-free list of keywords
//! - [`MetadataRecord`] - Keywords plus optional comment for one image
//! - [`ReadScope`] - Which part of the metadata a read is interested in
//!
//! # Validation
//!
//! `KeywordList` enforces its invariants at insertion time: empty keywords
//! are rejected and repeats are dropped, so a list that violates them cannot
//! be constructed.
//!
//! # Examples
//!
//! ```
//! use imgmeta::core::types::KeywordList;
//!
//! let mut list = KeywordList::new();
//! assert!(list.push("sun"));
//! assert!(list.push("beach"));
//! assert!(!list.push("sun"));
//! assert!(!list.push(""));
//!
//! assert_eq!(list.as_slice(), &["sun".to_string(), "beach".to_string()]);
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered sequence of unique, non-empty keywords.
///
/// Insertion order is significant and the first occurrence of a keyword
/// wins. Uniqueness is exact byte equality; `"Sun"` and `"sun"` are two
/// different keywords.
///
/// Membership checks are backed by a hash index so building a list from
/// `n` candidates is O(n).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordList {
    items: Vec<String>,
    index: HashSet<String>,
}

impl KeywordList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyword unless it is empty or already present.
    ///
    /// Returns `true` if the keyword was added.
    pub fn push(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if keyword.is_empty() || self.index.contains(&keyword) {
            return false;
        }
        self.index.insert(keyword.clone());
        self.items.push(keyword);
        true
    }

    /// Append every keyword of `other` that is not already present.
    pub fn extend_unique<I, S>(&mut self, other: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for keyword in other {
            self.push(keyword);
        }
    }

    /// Check whether `keyword` is in the list.
    pub fn contains(&self, keyword: &str) -> bool {
        self.index.contains(keyword)
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no keywords.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate the keywords in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    /// View the keywords as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Consume the list, returning the keywords in order.
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend_unique(iter);
        list
    }
}

impl From<Vec<String>> for KeywordList {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().collect()
    }
}

impl From<KeywordList> for Vec<String> {
    fn from(list: KeywordList) -> Self {
        list.items
    }
}

impl AsRef<[String]> for KeywordList {
    fn as_ref(&self) -> &[String] {
        &self.items
    }
}

impl IntoIterator for KeywordList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a KeywordList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for KeywordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items.join(", "))
    }
}

/// Keywords and comment for a single image.
///
/// Built fresh for every read/write/set call and never cached. `comment`
/// distinguishes "absent" (`None`) from "present but empty" (`Some("")`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Keywords in display order.
    pub keywords: KeywordList,
    /// Free-text comment, possibly multi-line.
    pub comment: Option<String>,
}

impl MetadataRecord {
    /// Create a record from its parts.
    pub fn new(keywords: KeywordList, comment: Option<String>) -> Self {
        Self { keywords, comment }
    }

    /// The comment if it is present and non-empty.
    pub fn non_empty_comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }

    /// Whether the record carries neither keywords nor a non-empty comment.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.non_empty_comment().is_none()
    }
}

/// The subset of metadata a caller asks for when reading.
///
/// A read fails with "not found" when the requested subset is absent, even
/// if the other part exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadScope {
    /// Only keywords.
    Keywords,
    /// Only the comment.
    Comment,
    /// Keywords and comment; fails only when both are absent.
    #[default]
    Both,
}

impl ReadScope {
    /// Whether keywords are part of this scope.
    pub fn wants_keywords(self) -> bool {
        matches!(self, ReadScope::Keywords | ReadScope::Both)
    }

    /// Whether the comment is part of this scope.
    pub fn wants_comment(self) -> bool {
        matches!(self, ReadScope::Comment | ReadScope::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod keyword_list {
        use super::*;

        #[test]
        fn keeps_first_occurrence_order() {
            let list: KeywordList = ["b", "a", "b", "c", "a"].into_iter().collect();
            assert_eq!(list.into_vec(), vec!["b", "a", "c"]);
        }

        #[test]
        fn rejects_empty_keywords() {
            let mut list = KeywordList::new();
            assert!(!list.push(""));
            assert!(list.is_empty());
        }

        #[test]
        fn membership_is_case_sensitive() {
            let list: KeywordList = ["Sun"].into_iter().collect();
            assert!(list.contains("Sun"));
            assert!(!list.contains("sun"));
        }

        #[test]
        fn extend_unique_appends_only_new() {
            let mut list: KeywordList = ["a", "b"].into_iter().collect();
            list.extend_unique(["b", "c", "a", "d"]);
            assert_eq!(list.as_slice(), &["a", "b", "c", "d"]);
        }

        #[test]
        fn serde_roundtrip_as_plain_array() {
            let list: KeywordList = ["x", "y"].into_iter().collect();
            let json = serde_json::to_string(&list).expect("serialize");
            assert_eq!(json, r#"["x","y"]"#);

            let parsed: KeywordList = serde_json::from_str(r#"["x","y","x"]"#).expect("parse");
            assert_eq!(parsed.as_slice(), &["x", "y"]);
        }

        #[test]
        fn display_joins_with_comma() {
            let list: KeywordList = ["sun", "beach"].into_iter().collect();
            assert_eq!(list.to_string(), "sun, beach");
        }
    }

    mod metadata_record {
        use super::*;

        #[test]
        fn empty_comment_counts_as_absent() {
            let record = MetadataRecord::new(KeywordList::new(), Some(String::new()));
            assert!(record.non_empty_comment().is_none());
            assert!(record.is_empty());
        }

        #[test]
        fn keywords_make_record_non_empty() {
            let record = MetadataRecord::new(["a"].into_iter().collect(), None);
            assert!(!record.is_empty());
        }
    }

    mod read_scope {
        use super::*;

        #[test]
        fn scope_flags() {
            assert!(ReadScope::Both.wants_keywords());
            assert!(ReadScope::Both.wants_comment());
            assert!(ReadScope::Keywords.wants_keywords());
            assert!(!ReadScope::Keywords.wants_comment());
            assert!(!ReadScope::Comment.wants_keywords());
            assert_eq!(ReadScope::default(), ReadScope::Both);
        }
    }
}
