//! Error types for the tidy-runner library.
//!
//! Note that a non-zero exit from the orchestrator is not an error here; it is
//! reported through the exit code returned by [`crate::run::run_main`].

use std::io;

// non-std crates
use thiserror::Error;

/// The top-level error type for the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Discovering the repository or walking the `HEAD` tree failed.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// The discovered repository has no work tree.
    #[error("repository at {0} is bare; a work tree is required")]
    BareRepository(String),

    /// Reading the ignore file or relaying output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The orchestrator executable could not be spawned.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}
