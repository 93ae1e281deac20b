//! engine::merge
//!
//! Combining the embedded and sidecar reads into one record.
//!
//! # Policy
//!
//! - Keywords: both sources found ⇒ embedded keywords then sidecar keywords,
//!   first occurrence wins. One source found ⇒ its list.
//! - Comment: both non-empty ⇒ `"{embedded}\n{sidecar}"`. Otherwise the one
//!   non-empty comment, if any.
//! - Neither source found ⇒ no record.

use crate::core::keywords::dedup_preserve_order;
use crate::core::types::MetadataRecord;

/// Outcome of reading one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRead {
    /// The backend produced data.
    Found(MetadataRecord),
    /// The backend has nothing for this file.
    Absent,
    /// The backend could not be read.
    Failed(String),
}

impl SourceRead {
    /// The record, if this source produced one.
    pub fn record(&self) -> Option<&MetadataRecord> {
        match self {
            SourceRead::Found(record) => Some(record),
            SourceRead::Absent | SourceRead::Failed(_) => None,
        }
    }

    /// Whether the source produced data.
    pub fn is_found(&self) -> bool {
        matches!(self, SourceRead::Found(_))
    }
}

/// Merge the two backend reads. Returns `None` when neither found data.
pub fn merge(embedded: &SourceRead, sidecar: &SourceRead) -> Option<MetadataRecord> {
    match (embedded.record(), sidecar.record()) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (Some(e), Some(s)) => {
            let keywords = dedup_preserve_order(
                e.keywords.iter().chain(s.keywords.iter()).cloned().collect(),
            );

            let comment = match (e.non_empty_comment(), s.non_empty_comment()) {
                (Some(a), Some(b)) => Some(format!("{}\n{}", a, b)),
                (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
                (None, None) => None,
            };

            Some(MetadataRecord::new(keywords, comment))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::KeywordList;

    fn found(keywords: &[&str], comment: Option<&str>) -> SourceRead {
        SourceRead::Found(MetadataRecord::new(
            keywords.iter().copied().collect::<KeywordList>(),
            comment.map(str::to_string),
        ))
    }

    #[test]
    fn neither_source_is_none() {
        assert_eq!(merge(&SourceRead::Absent, &SourceRead::Failed("x".into())), None);
    }

    #[test]
    fn single_source_used_as_is() {
        let sidecar = found(&["b", "a"], Some("side"));
        let merged = merge(&SourceRead::Absent, &sidecar).expect("merged");
        assert_eq!(Some(&merged), sidecar.record());

        let embedded = found(&["x"], None);
        let merged = merge(&embedded, &SourceRead::Failed("io".into())).expect("merged");
        assert_eq!(Some(&merged), embedded.record());
    }

    #[test]
    fn keywords_concatenate_without_duplicates() {
        let merged = merge(&found(&["a"], None), &found(&["a", "b"], None)).expect("merged");
        assert_eq!(merged.keywords.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn embedded_keywords_come_first() {
        let merged = merge(&found(&["z", "y"], None), &found(&["a", "z"], None)).expect("merged");
        let got: Vec<&str> = merged.keywords.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["z", "y", "a"]);
    }

    #[test]
    fn comments_join_with_newline() {
        let merged = merge(&found(&[], Some("emb")), &found(&[], Some("side\n"))).expect("merged");
        assert_eq!(merged.comment.as_deref(), Some("emb\nside\n"));
    }

    #[test]
    fn single_non_empty_comment_wins() {
        let merged = merge(&found(&["k"], None), &found(&[], Some("side"))).expect("merged");
        assert_eq!(merged.comment.as_deref(), Some("side"));

        let merged = merge(&found(&[], Some("emb")), &found(&["k"], Some(""))).expect("merged");
        assert_eq!(merged.comment.as_deref(), Some("emb"));
    }
}
