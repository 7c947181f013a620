//! Webprobe CLI Library
//!
//! Command-line interface for the Webprobe suite runner.

#![warn(missing_docs)]
#![allow(clippy::format_push_string)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, FormatArg, ListArgs, RunArgs};
pub use config::{resolve_suite_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, ProgressReporter};
pub use runner::{case_listing, list, run, session_manager, CaseListing};
