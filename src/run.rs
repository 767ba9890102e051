//! This module is the entry point of the tidy-runner package.
//!
//! It exposes 1 function: [`run_main()`], which the binary in `bin.rs` calls with the
//! process' command line arguments.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

// non-std crates
use log::set_max_level;

// project specific modules/crates
use crate::clang_tools::clang_tidy::check_compilation_database;
use crate::clang_tools::runner::{run_check_output, run_pass_through};
use crate::clang_tools::{
    build_command_line, log_tool_version, make_command, resolve_tool, CLANG_TIDY, RUN_CLANG_TIDY,
};
use crate::cli::{get_arg_parser, normalize_single_dash_args, RunnerOptions};
use crate::common_fs::{filter_source_files, normalize_path, read_ignore_globs};
use crate::error::RunnerError;
use crate::git::{get_repo_root, list_committed_files, open_repo};
use crate::logger::{self, end_log_group, level_from, start_log_group};

/// Makes a relative `path` absolute with respect to the caller's working directory.
///
/// run-clang-tidy is run from the repository root, so paths given on the command
/// line must not depend on the working directory any more.
fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize_path(&cwd.join(path))
    }
}

/// Same as [`absolutize`], but only for executables given as a path (with a separator);
/// bare names are still looked up in `$PATH`.
fn absolutize_program(program: &str, cwd: &Path) -> String {
    if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
        absolutize(Path::new(program), cwd)
            .to_string_lossy()
            .to_string()
    } else {
        program.to_string()
    }
}

/// This is the backend entry point for the console application.
///
/// `args` are the full command line including the program name (as given by
/// [`std::env::args`]). The returned value is the exit code the process should use:
///
/// - the exit code of run-clang-tidy, in the default mode
/// - in `-check-output` mode, run-clang-tidy's code if non-zero, else 1 if any line of
///   its output contained `warning:` or `error:`, else 0
/// - 0 for `--dry-run`
///
/// Errors are only returned for failures of this tool itself (git, the ignore file,
/// or launching run-clang-tidy).
pub fn run_main(args: Vec<String>) -> Result<i32, RunnerError> {
    let arg_parser = get_arg_parser();
    let args = arg_parser.get_matches_from(normalize_single_dash_args(args));
    let opts = RunnerOptions::from_matches(&args);

    if logger::init().is_err() {
        log::debug!("logger was already initialized");
    }
    set_max_level(level_from(
        &opts.verbosity,
        env::var("ACTIONS_STEP_DEBUG").ok().as_deref(),
    ));

    let cwd = env::current_dir()?;

    start_log_group(String::from("Get list of committed source files"));
    let repo = open_repo(&absolutize(&opts.repo_root, &cwd))?;
    let repo_root = normalize_path(&get_repo_root(&repo)?);
    log::debug!("Repository root: {}", repo_root.to_string_lossy());
    let committed = list_committed_files(&repo)?;
    let ignore = read_ignore_globs(&repo_root.join(&opts.ignore_file))?;
    let files = filter_source_files(&committed, &ignore);
    log::info!("Giving attention to the following files:");
    for file in &files {
        log::info!("  ./{file}");
    }
    end_log_group();

    let build_path = match &opts.build_path {
        Some(path) => absolutize(path, &cwd),
        None => repo_root.join("build"),
    };
    check_compilation_database(&build_path, &repo_root, &files);

    let orchestrator = absolutize_program(
        &resolve_tool(&opts.run_clang_tidy, RUN_CLANG_TIDY, &opts.clang_version),
        &cwd,
    );
    let linter = absolutize_program(
        &resolve_tool(&opts.clang_tidy, CLANG_TIDY, &opts.clang_version),
        &cwd,
    );
    log_tool_version(&linter);

    let mut run_opts = opts.clone();
    run_opts.export_fixes = opts
        .export_fixes
        .as_ref()
        .map(|path| absolutize(Path::new(path), &cwd).to_string_lossy().to_string());
    let cmd_line = build_command_line(&run_opts, &orchestrator, &linter, &build_path, &files);

    if opts.dry_run {
        println!("{}", cmd_line.join(" "));
        return Ok(0);
    }

    let cmd = make_command(&cmd_line, &repo_root);
    if opts.check_output {
        run_check_output(cmd, &mut io::stdout())
    } else {
        run_pass_through(cmd)
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use super::{absolutize, absolutize_program};

    #[test]
    fn absolute_paths_untouched() {
        let abs = if cfg!(windows) { "C:\\build" } else { "/build" };
        assert_eq!(absolutize(Path::new(abs), Path::new("/work")), PathBuf::from(abs));
    }

    #[cfg(unix)]
    #[test]
    fn relative_paths_joined() {
        assert_eq!(
            absolutize(Path::new("../out/./build"), Path::new("/work/repo")),
            PathBuf::from("/work/out/build")
        );
        assert_eq!(
            absolutize_program("./tools/run-clang-tidy", Path::new("/work")),
            "/work/tools/run-clang-tidy"
        );
        assert_eq!(absolutize_program("run-clang-tidy", Path::new("/work")), "run-clang-tidy");
    }
}
