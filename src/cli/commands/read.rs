//! read command - Show the keywords and comment of an image

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{require_file, with_engine};
use crate::cli::Context;
use crate::core::types::{MetadataRecord, ReadScope};
use crate::engine::MetadataError;
use crate::ui::output;

/// JSON shape of `read --json`.
#[derive(Debug, Serialize)]
struct ReadOutput<'a> {
    file: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

/// Show metadata for `file`.
pub fn read(ctx: &Context, file: &Path, scope: ReadScope, json: bool) -> Result<()> {
    require_file(file)?;

    let record = with_engine(ctx, |engine| match engine.read_scoped(file, scope) {
        Ok(record) => Ok(record),
        Err(MetadataError::NotFound(_)) => {
            let what = match scope {
                ReadScope::Keywords => "keywords",
                ReadScope::Comment => "comment",
                ReadScope::Both => "metadata",
            };
            anyhow::bail!("No {} found for {}", what, file.display())
        }
        Err(e) => Err(e).context("Failed to read metadata"),
    })?;

    if json {
        print_json(file, scope, &record)
    } else {
        print_text(scope, &record);
        Ok(())
    }
}

fn print_json(file: &Path, scope: ReadScope, record: &MetadataRecord) -> Result<()> {
    let out = ReadOutput {
        file,
        keywords: scope.wants_keywords().then(|| record.keywords.as_slice()),
        comment: if scope.wants_comment() {
            record.non_empty_comment()
        } else {
            None
        },
    };

    let text = serde_json::to_string_pretty(&out).context("Failed to encode JSON")?;
    println!("{}", text);
    Ok(())
}

fn print_text(scope: ReadScope, record: &MetadataRecord) {
    match scope {
        ReadScope::Keywords => {
            println!("{}", output::format_list(record.keywords.as_slice(), ""));
        }
        ReadScope::Comment => {
            println!("{}", output::indent(record.comment.as_deref().unwrap_or(""), ""));
        }
        ReadScope::Both => {
            if !record.keywords.is_empty() {
                println!("Keywords:");
                println!("{}", output::format_list(record.keywords.as_slice(), "  "));
            }
            if let Some(comment) = record.non_empty_comment() {
                println!("Comment:");
                println!("{}", output::indent(comment, "  "));
            }
        }
    }
}
