//! CLI module for dynquery
//!
//! Provides command-line interface for:
//! - fetch: browse one page
//! - export: request an export, optionally download it
//! - payload: print the encoded request
//! - sample: run a preset query
//! - shell: interactive session

mod args;
mod commands;
mod errors;
mod io;
mod shell;

pub use args::{Cli, Command, QueryArgs};
pub use commands::{export, fetch, load_config, payload, run, run_cli, sample};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use shell::{execute, run_shell, ShellCommand, HELP};
