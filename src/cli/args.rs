//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of the default lookup
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// imgmeta - keywords and comments for image files
#[derive(Parser, Debug)]
#[command(name = "imgmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the keywords and comment of an image
    #[command(
        name = "read",
        long_about = "Show the keywords and comment of an image.\n\n\
            Metadata embedded in the image and the sidecar file are both read \
            and merged. Keywords from both are combined without duplicates; \
            comments from both are joined with a newline.",
        after_help = "\
EXAMPLES:
    # Everything
    imgmeta read photo.jpg

    # Keywords only, one per line
    imgmeta read photo.jpg --keywords

    # Machine-readable
    imgmeta read photo.jpg --json"
    )]
    Read {
        /// Image file
        file: PathBuf,

        /// Only keywords; fails if there are none
        #[arg(long, conflicts_with = "comment")]
        keywords: bool,

        /// Only the comment; fails if there is none
        #[arg(long)]
        comment: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update keywords and/or the comment of an image
    #[command(
        name = "set",
        long_about = "Update keywords and/or the comment of an image.\n\n\
            Parts not given on the command line keep their current value. \
            Keywords are split on commas, semicolons and newlines.\n\n\
            With --append, new keywords are added to the existing ones and the \
            comment text is appended to the existing comment as is (no space \
            or newline is inserted).",
        after_help = "\
EXAMPLES:
    # Replace keywords
    imgmeta set photo.jpg --keywords 'beach, sunset'

    # Add a keyword
    imgmeta set photo.jpg --keywords holiday --append

    # Replace the comment
    imgmeta set photo.jpg --comment 'Taken from the pier'"
    )]
    Set {
        /// Image file
        file: PathBuf,

        /// Keywords as free text
        #[arg(long, value_name = "TEXT")]
        keywords: Option<String>,

        /// Comment text
        #[arg(long, value_name = "TEXT")]
        comment: Option<String>,

        /// Add to the current values instead of replacing them
        #[arg(long)]
        append: bool,
    },

    /// Overwrite the keywords and comment of an image
    #[command(
        name = "write",
        long_about = "Overwrite the keywords and comment of an image.\n\n\
            Whatever is not given is cleared. When save_in_image_file is set \
            the metadata goes into the image and any sidecar is removed; \
            otherwise, or if that fails, a sidecar file is written."
    )]
    Write {
        /// Image file
        file: PathBuf,

        /// Keywords as free text
        #[arg(long, value_name = "TEXT")]
        keywords: Option<String>,

        /// Comment text
        #[arg(long, value_name = "TEXT")]
        comment: Option<String>,
    },

    /// Split free text into keywords
    Tokenize {
        /// Text to split
        text: String,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "View or modify imgmeta configuration.\n\n\
            Configuration is read from $IMGMETA_CONFIG, \
            $XDG_CONFIG_HOME/imgmeta/config.toml or ~/.imgmeta/config.toml, \
            whichever exists first.",
        after_help = "\
EXAMPLES:
    # List all configuration values
    imgmeta config list

    # Store metadata inside images
    imgmeta config set save_in_image_file true

    # Keep sidecars next to the images
    imgmeta config set sidecar.local true"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    imgmeta completion bash >> ~/.bashrc

    # Fish
    imgmeta completion fish > ~/.config/fish/completions/imgmeta.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
    /// Show the config file in use
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
