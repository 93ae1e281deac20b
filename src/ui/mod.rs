//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity handling and output formatting
//!
//! # Design
//!
//! All status messages go through this module so quiet and debug modes
//! behave the same in every command. Library code logs through `log`
//! instead and never prints.

pub mod output;
