//! Taskprobe CLI library.
//!
//! Argument parsing, configuration layering, logging setup and terminal
//! output for the `taskprobe` binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Backend, Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::TestRunner;

use std::path::Path;
use taskprobe::SuiteConfig;

/// Suite configuration from `path`, or the defaults
pub fn load_suite_config(path: Option<&Path>) -> CliResult<SuiteConfig> {
    match path {
        Some(path) => Ok(SuiteConfig::from_yaml_file(path)?),
        None => Ok(SuiteConfig::default()),
    }
}
