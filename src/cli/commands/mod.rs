//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers never touch sidecar files or image bytes directly.

mod completion;
mod config_cmd;
mod read;
mod set;
mod tokenize;
mod write;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{
    get as config_get, list as config_list, path as config_path, set as config_set,
};
pub use read::read;
pub use set::set;
pub use tokenize::tokenize;
pub use write::write;

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use super::args::{Command, ConfigAction};
use super::Context;
use crate::core::types::ReadScope;
use crate::embedded::JpegXmpCodec;
use crate::engine::MetadataEngine;
use crate::sidecar::CacheLocator;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Read {
            file,
            keywords,
            comment,
            json,
        } => {
            let scope = match (keywords, comment) {
                (true, false) => ReadScope::Keywords,
                (false, true) => ReadScope::Comment,
                _ => ReadScope::Both,
            };
            read::read(ctx, &file, scope, json)
        }
        Command::Set {
            file,
            keywords,
            comment,
            append,
        } => set::set(ctx, &file, keywords.as_deref(), comment.as_deref(), append),
        Command::Write {
            file,
            keywords,
            comment,
        } => write::write(ctx, &file, keywords.as_deref(), comment.as_deref()),
        Command::Tokenize { text } => tokenize::tokenize(&text),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Run `f` with an engine over the JPEG codec and the configured sidecar
/// locations.
fn with_engine<T>(ctx: &Context, f: impl FnOnce(&MetadataEngine<'_>) -> Result<T>) -> Result<T> {
    let codec = JpegXmpCodec::new();
    let locator =
        CacheLocator::from_config(&ctx.config).context("Failed to resolve sidecar location")?;
    let engine = MetadataEngine::new(&codec, &locator, &ctx.config);
    f(&engine)
}

/// Fail early on image paths that do not exist.
fn require_file(file: &Path) -> Result<()> {
    if !file.is_file() {
        bail!("No such image file: {}", file.display());
    }
    Ok(())
}
