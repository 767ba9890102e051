//! This is the tidy_runner package's binary executable's source code.

use std::{env, process};

// non-std crates
use anyhow::Result;

// project specific modules/crates
use tidy_runner::run::run_main;

/// This takes the CLI arguments and passes them to [`tidy_runner::run::run_main`],
/// then exits with the exit code it decided.
pub fn main() -> Result<()> {
    let code = run_main(env::args().collect::<Vec<String>>())?;
    process::exit(code);
}
