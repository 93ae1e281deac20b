//! cli
//!
//! Command-line interface layer for imgmeta.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging and load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands the work to
//! the [`crate::engine`]. Handlers only translate arguments and format output.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use log::LevelFilter;

use crate::core::config::Config;
use crate::ui::output::{self, Verbosity};

/// Per-invocation state shared by command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// Explicit `--config` path, if given.
    pub config_path: Option<PathBuf>,
    /// Output verbosity.
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    init_logging(verbosity);

    let loaded = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    if let Some(path) = loaded.config.loaded_from() {
        log::debug!("using config {}", path.display());
    }

    let ctx = Context {
        config: loaded.config,
        config_path: cli.config.clone(),
        verbosity,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr logger. `RUST_LOG` overrides the flag-derived level.
fn init_logging(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Quiet => LevelFilter::Error,
        Verbosity::Normal => LevelFilter::Warn,
        Verbosity::Debug => LevelFilter::Debug,
    };

    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();

    if let Err(e) = result {
        output::debug(format!("logger already initialised: {}", e), verbosity);
    }
}
