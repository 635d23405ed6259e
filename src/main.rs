//! cephx-key CLI entry point
//!
//! Parses arguments, dispatches through the CLI module, prints errors
//! to stderr and exits non-zero on failure. All real logic lives in the
//! library.

use cephx_key::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
