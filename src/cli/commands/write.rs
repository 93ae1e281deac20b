//! write command - Overwrite the keywords and comment of an image

use std::path::Path;

use anyhow::{Context as _, Result};

use super::{require_file, with_engine};
use crate::cli::Context;
use crate::core::keywords::tokenize;
use crate::engine::WriteTarget;
use crate::ui::output;

/// Overwrite metadata for `file`. Omitted parts are cleared.
pub fn write(
    ctx: &Context,
    file: &Path,
    keywords: Option<&str>,
    comment: Option<&str>,
) -> Result<()> {
    require_file(file)?;

    let keywords = keywords.map(tokenize).unwrap_or_default();

    let target = with_engine(ctx, |engine| {
        engine
            .try_write(file, keywords.as_slice(), comment)
            .context("Failed to write metadata")
    })?;

    let message = match target {
        WriteTarget::Embedded => format!("Wrote metadata into {}", file.display()),
        WriteTarget::Sidecar(path) => format!("Wrote sidecar {}", path.display()),
    };
    output::print(message, ctx.verbosity);
    Ok(())
}
