//! The root module for the tidy_runner package when compiled as a library.
//! This module mainly holds the declarations of this package's other modules.
//!
//! The tool runs clang-tidy (through its `run-clang-tidy` wrapper) on the C/C++
//! files committed to a git repository, optionally turning any reported warning or
//! error into a failing exit code for CI.

// project specific modules/crates
pub mod clang_tools;
pub mod cli;
pub mod common_fs;
pub mod error;
pub mod git;
pub mod logger;
pub mod run;
