//! This module holds the functionality related to locating the clang tools and
//! assembling the run-clang-tidy command line.

use std::{
    env::current_dir,
    path::{Path, PathBuf},
    process::Command,
};

// non-std crates
use semver::Version;
use which::{which, which_in};

// project-specific modules/crates
use crate::cli::RunnerOptions;
pub mod clang_tidy;
pub mod runner;

/// The default name of the orchestrator executable.
pub const RUN_CLANG_TIDY: &str = "run-clang-tidy";

/// The default name of the linter executable.
pub const CLANG_TIDY: &str = "clang-tidy";

/// Fetch the path to a clang tool by `name` (ie `"clang-tidy"` or `"run-clang-tidy"`)
/// and `version`.
///
/// The specified `version` can be either
///
/// - a full or partial semantic version specification
/// - a path to a directory containing the executable binary `name`d
///
/// If the executable is not found using the specified semantic `version`, then the
/// tool is sought only by it's `name`.
///
/// The only reason this function would return an error is if the specified tool is not
/// installed or present on the system (nor in the `$PATH` environment variable).
pub fn get_clang_tool_exe(name: &str, version: &str) -> Result<PathBuf, &'static str> {
    if version.is_empty() {
        // The default CLI value is an empty string.
        // Thus, we should use whatever is installed and added to $PATH.
        return which(name).map_err(|_| "Could not find clang tool by name");
    }
    if let Ok(semver) = lenient_semver::parse_into::<Version>(version) {
        // `version` specified has at least a major version number
        if let Ok(cmd) = which(format!("{}-{}", name, semver.major)) {
            Ok(cmd)
        } else {
            // On Windows, the version's major number is typically not appended to the
            // executable's name, so fall back to the unversioned name.
            which(name).map_err(|_| "Could not find clang tool by name and version")
        }
    } else {
        // `version` specified is not a semantic version; treat as path/to/bin
        let cwd = current_dir().map_err(|_| "Could not determine working directory")?;
        which_in(name, Some(version), cwd).map_err(|_| "Could not find clang tool by path")
    }
}

/// Decides which program to invoke for a tool.
///
/// A `configured` value that differs from the tool's `default_name` was given
/// explicitly by the user and is used verbatim. Otherwise the tool is looked up via
/// [`get_clang_tool_exe`]. If that fails, the bare name is returned so the OS
/// reports the launch failure.
pub fn resolve_tool(configured: &str, default_name: &str, version: &str) -> String {
    if configured != default_name {
        return configured.to_string();
    }
    match get_clang_tool_exe(default_name, version) {
        Ok(path) => {
            log::debug!("Using {}", path.to_string_lossy());
            path.to_string_lossy().to_string()
        }
        Err(msg) => {
            log::debug!("{msg}: {default_name}");
            configured.to_string()
        }
    }
}

/// Logs the `--version` output of the given `exe` at debug level.
///
/// Failure to run the tool is logged too, but otherwise ignored; run-clang-tidy will
/// report it in its own way.
pub fn log_tool_version(exe: &str) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match Command::new(exe).arg("--version").output() {
        Ok(output) => log::debug!(
            "{} --version\n{}",
            exe,
            String::from_utf8_lossy(&output.stdout)
        ),
        Err(e) => log::debug!("Could not run {exe} --version: {e}"),
    }
}

/// Assembles the run-clang-tidy command line, program name first.
///
/// The layout is
/// `[orchestrator, -p, build_path, -clang-tidy, linter, (-j n)?, (-export-fixes path)?, (-fix -format)?, files...]`.
pub fn build_command_line(
    opts: &RunnerOptions,
    orchestrator: &str,
    linter: &str,
    build_path: &Path,
    files: &[String],
) -> Vec<String> {
    let mut cmd_line = vec![
        orchestrator.to_string(),
        "-p".to_string(),
        build_path.to_string_lossy().to_string(),
        "-clang-tidy".to_string(),
        linter.to_string(),
    ];
    if let Some(jobs) = opts.jobs {
        cmd_line.extend(["-j".to_string(), jobs.to_string()]);
    }
    if let Some(fixes) = &opts.export_fixes {
        cmd_line.extend(["-export-fixes".to_string(), fixes.clone()]);
    }
    if opts.fix {
        cmd_line.extend(["-fix".to_string(), "-format".to_string()]);
    }
    cmd_line.extend(files.iter().cloned());
    cmd_line
}

/// Creates a [`Command`] for the given `cmd_line` that runs in `working_dir`.
pub fn make_command(cmd_line: &[String], working_dir: &Path) -> Command {
    let mut cmd = Command::new(&cmd_line[0]);
    cmd.args(&cmd_line[1..]).current_dir(working_dir);
    cmd
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{build_command_line, get_clang_tool_exe, resolve_tool, CLANG_TIDY};
    use crate::cli::{get_arg_parser, normalize_single_dash_args, RunnerOptions};

    fn options(input: &[&str]) -> RunnerOptions {
        let args = normalize_single_dash_args(input.iter().map(|s| s.to_string()).collect());
        RunnerOptions::from_matches(&get_arg_parser().try_get_matches_from(args).unwrap())
    }

    fn files() -> Vec<String> {
        vec!["src/a.cpp".to_string(), "src/b.h".to_string()]
    }

    #[test]
    fn minimal_command_line() {
        let opts = options(&["tidy-runner"]);
        let cmd_line = build_command_line(
            &opts,
            "run-clang-tidy",
            "clang-tidy",
            Path::new("/repo/build"),
            &files(),
        );
        assert_eq!(
            cmd_line,
            [
                "run-clang-tidy",
                "-p",
                "/repo/build",
                "-clang-tidy",
                "clang-tidy",
                "src/a.cpp",
                "src/b.h"
            ]
        );
    }

    #[test]
    fn full_command_line() {
        let opts = options(&["tidy-runner", "-j", "4", "-export-fixes", "fixes.yaml", "-fix"]);
        let cmd_line = build_command_line(
            &opts,
            "run-clang-tidy-17",
            "/usr/bin/clang-tidy-17",
            &PathBuf::from("out"),
            &files(),
        );
        assert_eq!(
            cmd_line,
            [
                "run-clang-tidy-17",
                "-p",
                "out",
                "-clang-tidy",
                "/usr/bin/clang-tidy-17",
                "-j",
                "4",
                "-export-fixes",
                "fixes.yaml",
                "-fix",
                "-format",
                "src/a.cpp",
                "src/b.h"
            ]
        );
    }

    #[test]
    fn no_files_still_builds() {
        let opts = options(&["tidy-runner"]);
        let cmd_line = build_command_line(&opts, "rct", "ct", Path::new("build"), &[]);
        assert_eq!(cmd_line, ["rct", "-p", "build", "-clang-tidy", "ct"]);
    }

    #[test]
    fn explicit_tool_is_verbatim() {
        assert_eq!(
            resolve_tool("/opt/llvm/bin/clang-tidy", CLANG_TIDY, "17"),
            "/opt/llvm/bin/clang-tidy"
        );
    }

    #[test]
    fn unresolvable_falls_back_to_name() {
        let name = "definitely-not-a-clang-tool";
        assert!(get_clang_tool_exe(name, "").is_err());
        assert_eq!(resolve_tool(name, name, ""), name);
    }

    #[test]
    fn bad_path_version() {
        let tmp = tempfile::tempdir().unwrap();
        let result = get_clang_tool_exe(CLANG_TIDY, &tmp.path().to_string_lossy());
        assert!(result.is_err());
    }
}
