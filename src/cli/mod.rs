//! CLI shell for cephx-key
//!
//! Maps command-line arguments (or a JSON request on stdin) to a
//! reconciliation request, runs it against the live toolchain, prints
//! the report as a single JSON document on stdout, and turns fatal
//! outcomes into a non-zero process exit.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{ApplyArgs, Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_report};
