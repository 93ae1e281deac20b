//! set command - Update keywords and/or the comment of an image

use std::path::Path;

use anyhow::{bail, Result};

use super::{require_file, with_engine};
use crate::cli::Context;
use crate::core::keywords::tokenize;
use crate::ui::output;

/// Update metadata for `file`.
///
/// Keywords arrive as free text and are tokenized. Write failures inside the
/// engine are logged rather than returned.
pub fn set(
    ctx: &Context,
    file: &Path,
    keywords: Option<&str>,
    comment: Option<&str>,
    append: bool,
) -> Result<()> {
    require_file(file)?;

    if keywords.is_none() && comment.is_none() {
        bail!("Nothing to set. Pass --keywords and/or --comment.");
    }

    let keywords = keywords.map(tokenize);

    with_engine(ctx, |engine| {
        engine.set(
            file,
            keywords.as_ref().map(|k| k.as_slice()),
            comment,
            append,
        );
        Ok(())
    })?;

    output::print(format!("Updated {}", file.display()), ctx.verbosity);
    Ok(())
}
