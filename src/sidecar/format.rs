//! sidecar::format
//!
//! The sidecar text format.
//!
//! ```text
//! #imgmeta comment (0.1.0)
//!
//! [keywords]
//! sun
//! beach
//!
//! [comment]
//! nice day
//! #end
//! ```
//!
//! # Parsing
//!
//! Parsing is a three-state machine (`None`, `Keywords`, `Comment`) and
//! never fails on content:
//!
//! - Lines starting with `#` are skipped in every state.
//! - A line `[name]` switches section; `keywords` and `comment` are matched
//!   case-insensitively, anything else switches to `None`.
//! - Inside `[comment]` a leading `[` is ordinary text, so the comment
//!   section runs to the end of the file.
//! - Lines outside a known section are ignored.
//!
//! Keyword lines are taken verbatim minus the line terminator. Comment lines
//! are concatenated with their newlines; leading newlines are stripped and
//! trailing ones collapsed to at most one.
//!
//! Invalid UTF-8 is repaired lossily rather than rejected.
//!
//! # Writing
//!
//! [`serialize`] refuses content the parser would read back differently:
//! empty keywords, keywords starting with `#` or `[` or holding a line break,
//! and comment lines starting with `#`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::SidecarError;
use crate::core::durable::ScopedWrite;
use crate::core::types::{KeywordList, MetadataRecord};

/// Name written into the sidecar header line.
pub const WRITER_NAME: &str = "imgmeta";

/// Version written into the sidecar header line.
pub const WRITER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Keywords,
    Comment,
}

impl Section {
    /// Section selected by a header line, or `None` if the line is not a
    /// well-formed `[name]` header.
    fn from_header(line: &str) -> Section {
        let Some(name) = line
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            return Section::None;
        };

        if name.eq_ignore_ascii_case("keywords") {
            Section::Keywords
        } else if name.eq_ignore_ascii_case("comment") {
            Section::Comment
        } else {
            Section::None
        }
    }
}

/// Parse the sidecar at `path`.
///
/// # Errors
///
/// Returns [`SidecarError::NotFound`] if the file cannot be opened. Content
/// problems never produce an error.
pub fn parse(path: &Path) -> Result<MetadataRecord, SidecarError> {
    let file = File::open(path).map_err(|source| SidecarError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_reader(BufReader::new(file)))
}

/// Parse sidecar content from any buffered reader.
///
/// A read error part-way through ends parsing; whatever was collected up to
/// that point is returned.
pub fn parse_reader<R: BufRead>(mut reader: R) -> MetadataRecord {
    let mut section = Section::None;
    let mut keywords: Vec<String> = Vec::new();
    let mut comment: Option<String> = None;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("sidecar read stopped early: {}", e);
                break;
            }
        }

        let line = String::from_utf8_lossy(&raw);

        if line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && section != Section::Comment {
            section = Section::from_header(strip_line_end(&line));
            continue;
        }

        match section {
            Section::None => {}
            Section::Keywords => {
                let keyword = strip_line_end(&line);
                if !keyword.is_empty() {
                    keywords.push(keyword.to_string());
                }
            }
            Section::Comment => comment.get_or_insert_with(String::new).push_str(&line),
        }
    }

    MetadataRecord::new(
        KeywordList::from(keywords),
        comment.and_then(|text| normalize_comment(&text)),
    )
}

fn strip_line_end(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Strip leading newlines and collapse trailing ones to at most one.
///
/// Returns `None` when nothing but newlines remains.
fn normalize_comment(text: &str) -> Option<String> {
    let text = text.trim_start_matches('\n');
    let body = text.trim_end_matches('\n');
    if body.is_empty() {
        return None;
    }

    let mut out = body.to_string();
    if body.len() < text.len() {
        out.push('\n');
    }
    Some(out)
}

/// Render a record in sidecar format.
pub fn render(keywords: &[String], comment: Option<&str>) -> String {
    let mut out = format!("#{} comment ({})\n\n", WRITER_NAME, WRITER_VERSION);

    out.push_str("[keywords]\n");
    for keyword in keywords {
        out.push_str(keyword);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("[comment]\n");
    out.push_str(comment.unwrap_or(""));
    out.push('\n');

    out.push_str("#end\n");
    out
}

/// First piece of text that would not survive a render-parse cycle.
fn unrepresentable<'a>(keywords: &'a [String], comment: Option<&'a str>) -> Option<&'a str> {
    let bad_keyword = keywords.iter().map(String::as_str).find(|keyword| {
        keyword.is_empty()
            || keyword.starts_with(['#', '['])
            || keyword.contains(['\n', '\r'])
    });

    bad_keyword.or_else(|| comment?.split('\n').find(|line| line.starts_with('#')))
}

/// Write a sidecar to `path`, replacing any existing file atomically.
///
/// # Errors
///
/// [`SidecarError::Unrepresentable`] when a keyword or comment line would be
/// misread on the next parse. On any error nothing is written and an existing
/// sidecar stays as it was.
pub fn serialize(
    path: &Path,
    keywords: &[String],
    comment: Option<&str>,
) -> Result<(), SidecarError> {
    if let Some(text) = unrepresentable(keywords, comment) {
        return Err(SidecarError::Unrepresentable(text.to_string()));
    }

    let mut out = ScopedWrite::open(path)?;
    out.append(&render(keywords, comment))?;
    out.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse_str(text: &str) -> MetadataRecord {
        parse_reader(text.as_bytes())
    }

    mod parsing {
        use super::*;

        #[test]
        fn full_document() {
            let record = parse_str(
                "#imgmeta comment (0.1.0)\n\n[keywords]\nsun\nbeach\n\n[comment]\nnice day\n#end\n",
            );
            assert_eq!(record.keywords.as_slice(), &["sun", "beach"]);
            assert_eq!(record.comment.as_deref(), Some("nice day\n"));
        }

        #[test]
        fn empty_input() {
            let record = parse_str("");
            assert!(record.keywords.is_empty());
            assert!(record.comment.is_none());
        }

        #[test]
        fn lines_outside_sections_are_ignored() {
            let record = parse_str("stray\nlines\n[keywords]\nkept\n");
            assert_eq!(record.keywords.as_slice(), &["kept"]);
        }

        #[test]
        fn headers_are_case_insensitive() {
            let record = parse_str("[KeyWords]\na\n[COMMENT]\ntext\n");
            assert_eq!(record.keywords.as_slice(), &["a"]);
            assert_eq!(record.comment.as_deref(), Some("text\n"));
        }

        #[test]
        fn unknown_section_switches_off_collection() {
            let record = parse_str("[keywords]\na\n[other]\nb\n[keywords]\nc\n");
            assert_eq!(record.keywords.as_slice(), &["a", "c"]);
        }

        #[test]
        fn header_with_trailing_text_is_not_recognized() {
            let record = parse_str("[keywords] extra\na\n");
            assert!(record.keywords.is_empty());
        }

        #[test]
        fn unterminated_header_is_not_recognized() {
            let record = parse_str("[keywords\na\n");
            assert!(record.keywords.is_empty());
        }

        #[test]
        fn hash_lines_skipped_everywhere() {
            let record = parse_str("[keywords]\n#note\na\n[comment]\nline one\n# hidden\nline two\n");
            assert_eq!(record.keywords.as_slice(), &["a"]);
            assert_eq!(record.comment.as_deref(), Some("line one\nline two\n"));
        }

        #[test]
        fn brackets_inside_comment_are_text() {
            let record = parse_str("[comment]\nsee [keywords]\n[keywords]\nnot-a-keyword\n");
            assert!(record.keywords.is_empty());
            assert_eq!(
                record.comment.as_deref(),
                Some("see [keywords]\n[keywords]\nnot-a-keyword\n")
            );
        }

        #[test]
        fn blank_keyword_lines_skipped() {
            let record = parse_str("[keywords]\n\na\n\n\nb\n");
            assert_eq!(record.keywords.as_slice(), &["a", "b"]);
        }

        #[test]
        fn keywords_kept_verbatim() {
            let record = parse_str("[keywords]\n  padded  \n");
            assert_eq!(record.keywords.as_slice(), &["  padded  "]);
        }

        #[test]
        fn crlf_line_endings() {
            let record = parse_str("[keywords]\r\na\r\nb\r\n");
            assert_eq!(record.keywords.as_slice(), &["a", "b"]);
        }

        #[test]
        fn last_line_without_newline() {
            let record = parse_str("[keywords]\na\nb");
            assert_eq!(record.keywords.as_slice(), &["a", "b"]);
        }

        #[test]
        fn comment_newline_normalization() {
            let record = parse_str("[comment]\n\n\nfirst\n\nsecond\n\n\n\n");
            assert_eq!(record.comment.as_deref(), Some("first\n\nsecond\n"));
        }

        #[test]
        fn comment_without_trailing_newline() {
            let record = parse_str("[comment]\nno newline");
            assert_eq!(record.comment.as_deref(), Some("no newline"));
        }

        #[test]
        fn blank_comment_is_absent() {
            let record = parse_str("[comment]\n\n\n#end\n");
            assert!(record.comment.is_none());
        }

        #[test]
        fn invalid_utf8_is_repaired() {
            let bytes: &[u8] = b"[keywords]\nca\xfft\n";
            let record = parse_reader(bytes);
            assert_eq!(record.keywords.as_slice(), &["ca\u{fffd}t"]);
        }

        #[test]
        fn duplicate_keywords_collapse() {
            let record = parse_str("[keywords]\na\nb\na\n");
            assert_eq!(record.keywords.as_slice(), &["a", "b"]);
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn layout() {
            let text = render(&strings(&["sun", "beach"]), Some("nice day"));
            let expected = format!(
                "#{} comment ({})\n\n[keywords]\nsun\nbeach\n\n[comment]\nnice day\n#end\n",
                WRITER_NAME, WRITER_VERSION
            );
            assert_eq!(text, expected);
        }

        #[test]
        fn absent_comment_is_empty_line() {
            let text = render(&[], None);
            assert!(text.ends_with("[keywords]\n\n[comment]\n\n#end\n"));
        }
    }

    mod files {
        use super::*;

        #[test]
        fn roundtrip_through_file() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("photo.jpg.gqv");

            serialize(&path, &strings(&["sun", "beach"]), Some("nice day")).expect("serialize");
            let record = parse(&path).expect("parse");

            assert_eq!(record.keywords.as_slice(), &["sun", "beach"]);
            assert_eq!(record.comment.as_deref(), Some("nice day\n"));
        }

        #[test]
        fn multiline_comment_roundtrip() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("photo.jpg.gqv");

            serialize(&path, &[], Some("line one\nline two")).expect("serialize");
            let record = parse(&path).expect("parse");

            assert!(record.keywords.is_empty());
            assert_eq!(record.comment.as_deref(), Some("line one\nline two\n"));
        }

        #[test]
        fn parse_missing_file_is_not_found() {
            let temp = TempDir::new().expect("create temp dir");
            let err = parse(&temp.path().join("absent.gqv")).unwrap_err();
            assert!(matches!(err, SidecarError::NotFound { .. }));
        }

        #[test]
        fn serialize_into_missing_directory_fails_cleanly() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("nope").join("photo.jpg.gqv");

            let err = serialize(&path, &strings(&["a"]), None).unwrap_err();
            assert!(matches!(err, SidecarError::Write(_)));
            assert!(!path.exists());
        }

        #[test]
        fn markup_keywords_are_refused() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("photo.jpg.gqv");
            fs::write(&path, "[keywords]\nold\n").expect("seed");

            for keyword in ["#1 pick", "[comment]", "two\nlines", "cr\r", ""] {
                let err = serialize(&path, &strings(&["sun", keyword]), Some("nice")).unwrap_err();
                assert!(
                    matches!(&err, SidecarError::Unrepresentable(text) if text == keyword),
                    "{:?} gave {:?}",
                    keyword,
                    err
                );
            }

            let record = parse(&path).expect("parse");
            assert_eq!(record.keywords.as_slice(), &["old"]);
        }

        #[test]
        fn hash_comment_line_is_refused() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("photo.jpg.gqv");

            let err = serialize(&path, &[], Some("fine\n#2 of 3")).unwrap_err();
            assert!(matches!(err, SidecarError::Unrepresentable(text) if text == "#2 of 3"));
            assert!(!path.exists());
        }

        #[test]
        fn inner_markup_characters_are_stored() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("photo.jpg.gqv");

            serialize(&path, &strings(&["pick #1", "a [b]"]), Some("see [keywords]\nissue #4"))
                .expect("serialize");
            let record = parse(&path).expect("parse");

            assert_eq!(record.keywords.as_slice(), &["pick #1", "a [b]"]);
            assert_eq!(record.comment.as_deref(), Some("see [keywords]\nissue #4\n"));
        }

        #[test]
        fn serialize_replaces_existing() {
            let temp = TempDir::new().expect("create temp dir");
            let path = temp.path().join("photo.jpg.gqv");
            fs::write(&path, "[keywords]\nold\n").expect("seed");

            serialize(&path, &strings(&["new"]), None).expect("serialize");
            let record = parse(&path).expect("parse");
            assert_eq!(record.keywords.as_slice(), &["new"]);
        }
    }
}
