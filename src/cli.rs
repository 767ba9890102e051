//! This module holds the Command Line Interface design.

use std::path::PathBuf;

// non-std crates
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// Long option names that are also accepted with a single leading dash
/// (`-export-fixes`), the spelling clang-tidy and run-clang-tidy use.
const SINGLE_DASH_LONGS: [&str; 11] = [
    "export-fixes",
    "run-clang-tidy",
    "clang-tidy",
    "fix",
    "check-output",
    "verbosity",
    "repo-root",
    "ignore-file",
    "clang-version",
    "dry-run",
    "help",
];

/// Builds and returns the Command Line Interface's argument parsing object.
pub fn get_arg_parser() -> Command {
    Command::new("tidy-runner")
        .about("Run clang-tidy on all currently committed C/C++ files")
        .arg(
            Arg::new("build-path")
                .short('p')
                .value_name("BUILD_PATH")
                .value_parser(value_parser!(PathBuf))
                .long_help(
                    "Path to the build directory. This is the directory holding the
compile_commands.json database (set ``CMAKE_EXPORT_COMPILE_COMMANDS`` to ``ON``).
Defaults to ``build`` under the repository root.",
                ),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .value_name("THREADS")
                .value_parser(value_parser!(u32))
                .long_help("Number of threads run-clang-tidy should run in parallel."),
        )
        .arg(
            Arg::new("export-fixes")
                .long("export-fixes")
                .value_name("PATH")
                .long_help("Path to the file where run-clang-tidy should store suggested fixes."),
        )
        .arg(
            Arg::new("run-clang-tidy")
                .long("run-clang-tidy")
                .value_name("PATH")
                .default_value("run-clang-tidy")
                .long_help("Name or path of the run-clang-tidy executable to use."),
        )
        .arg(
            Arg::new("clang-tidy")
                .long("clang-tidy")
                .value_name("PATH")
                .default_value("clang-tidy")
                .long_help("Name or path of the clang-tidy executable to use."),
        )
        .arg(
            Arg::new("fix")
                .long("fix")
                .action(ArgAction::SetTrue)
                .long_help("Attempt to fix the issues (passes ``-fix -format`` to run-clang-tidy)."),
        )
        .arg(
            Arg::new("check-output")
                .long("check-output")
                .action(ArgAction::SetTrue)
                .long_help(
                    "Check output for warnings and errors and exit with a non-zero
return code if such are found. Disables formatted output.",
                ),
        )
        .arg(
            Arg::new("verbosity")
                .long("verbosity")
                .short('v')
                .default_value("info")
                .value_parser(["debug", "info"])
                .long_help(
                    "This controls the verbosity of this tool's own log output.
It does not affect the output of run-clang-tidy.",
                ),
        )
        .arg(
            Arg::new("repo-root")
                .long("repo-root")
                .short('r')
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .long_help(
                    "A path inside the repository to lint. The repository root is
discovered from here by walking up to the enclosing git work tree.",
                ),
        )
        .arg(
            Arg::new("ignore-file")
                .long("ignore-file")
                .short('i')
                .default_value(".clang-tidy.ignore")
                .long_help(
                    "The file (relative to the repository root) listing glob patterns of
paths to skip, one per line. Lines starting with ``#`` are comments.
A missing file means nothing is ignored.",
                ),
        )
        .arg(
            Arg::new("clang-version")
                .long("clang-version")
                .short('V')
                .default_value("")
                .long_help(
                    "The desired version of the clang tools to use when the executables
are left at their default names. Accepted values are a version number
(eg ``17``) or a path to the directory where the clang tools are installed.

- Set this option to a blank string (``''``) to use the
  platform's default installed version.",
                ),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .long_help("Print the run-clang-tidy command line instead of running it."),
        )
}

/// Rewrites single-dash long options (`-check-output`, `-export-fixes=out.yaml`)
/// into their double-dash form so [`get_arg_parser`] accepts both spellings.
///
/// Short options (`-p`, `-j4`) and everything else pass through untouched.
pub fn normalize_single_dash_args(args: Vec<String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| {
            if arg.starts_with('-') && !arg.starts_with("--") {
                let name = arg[1..].split('=').next().unwrap_or_default();
                if SINGLE_DASH_LONGS.contains(&name) {
                    return format!("-{arg}");
                }
            }
            arg
        })
        .collect()
}

/// The parsed options used for a single invocation of the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// The build directory passed to run-clang-tidy as `-p`.
    ///
    /// [`None`] means the default of `<repo_root>/build`.
    pub build_path: Option<PathBuf>,

    /// The number of parallel jobs for run-clang-tidy.
    pub jobs: Option<u32>,

    /// Where run-clang-tidy should export fixes.
    pub export_fixes: Option<String>,

    /// Name or path of the orchestrator executable.
    pub run_clang_tidy: String,

    /// Name or path of the linter executable.
    pub clang_tidy: String,

    /// Ask run-clang-tidy to apply fixes and reformat.
    pub fix: bool,

    /// Derive the exit code from diagnostics found in the output.
    pub check_output: bool,

    pub verbosity: String,
    pub repo_root: PathBuf,
    pub ignore_file: String,
    pub clang_version: String,
    pub dry_run: bool,
}

impl RunnerOptions {
    /// Extracts options from matches produced by [`get_arg_parser`].
    pub fn from_matches(args: &ArgMatches) -> Self {
        let string_arg = |id: &str| args.get_one::<String>(id).cloned().unwrap_or_default();
        RunnerOptions {
            build_path: args.get_one::<PathBuf>("build-path").cloned(),
            jobs: args.get_one::<u32>("jobs").copied(),
            export_fixes: args.get_one::<String>("export-fixes").cloned(),
            run_clang_tidy: string_arg("run-clang-tidy"),
            clang_tidy: string_arg("clang-tidy"),
            fix: args.get_flag("fix"),
            check_output: args.get_flag("check-output"),
            verbosity: string_arg("verbosity"),
            repo_root: args
                .get_one::<PathBuf>("repo-root")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
            ignore_file: string_arg("ignore-file"),
            clang_version: string_arg("clang-version"),
            dry_run: args.get_flag("dry-run"),
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::{get_arg_parser, normalize_single_dash_args, RunnerOptions};

    fn parse(input: &[&str]) -> RunnerOptions {
        let args = normalize_single_dash_args(input.iter().map(|s| s.to_string()).collect());
        let matches = get_arg_parser().try_get_matches_from(args).unwrap();
        RunnerOptions::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let opts = parse(&["tidy-runner"]);
        assert_eq!(opts.build_path, None);
        assert_eq!(opts.jobs, None);
        assert_eq!(opts.export_fixes, None);
        assert_eq!(opts.run_clang_tidy, "run-clang-tidy");
        assert_eq!(opts.clang_tidy, "clang-tidy");
        assert!(!opts.fix);
        assert!(!opts.check_output);
        assert!(!opts.dry_run);
        assert_eq!(opts.verbosity, "info");
        assert_eq!(opts.ignore_file, ".clang-tidy.ignore");
        assert_eq!(opts.repo_root, PathBuf::from("."));
        assert!(opts.clang_version.is_empty());
    }

    #[test]
    fn single_dash_longs() {
        let opts = parse(&[
            "tidy-runner",
            "-p",
            "out/debug",
            "-j",
            "8",
            "-export-fixes",
            "fixes.yaml",
            "-run-clang-tidy=run-clang-tidy-17",
            "-clang-tidy",
            "/opt/llvm/bin/clang-tidy",
            "-fix",
            "-check-output",
        ]);
        assert_eq!(opts.build_path, Some(PathBuf::from("out/debug")));
        assert_eq!(opts.jobs, Some(8));
        assert_eq!(opts.export_fixes.as_deref(), Some("fixes.yaml"));
        assert_eq!(opts.run_clang_tidy, "run-clang-tidy-17");
        assert_eq!(opts.clang_tidy, "/opt/llvm/bin/clang-tidy");
        assert!(opts.fix);
        assert!(opts.check_output);
    }

    #[test]
    fn double_dash_matches_single_dash() {
        let single = parse(&["tidy-runner", "-check-output", "-export-fixes", "f.yaml"]);
        let double = parse(&["tidy-runner", "--check-output", "--export-fixes", "f.yaml"]);
        assert_eq!(single, double);
    }

    #[test]
    fn attached_short_values_untouched() {
        let args = normalize_single_dash_args(vec!["-j4".to_string(), "-pbuild".to_string()]);
        assert_eq!(args, ["-j4", "-pbuild"]);
        let opts = parse(&["tidy-runner", "-j4", "-pbuild"]);
        assert_eq!(opts.jobs, Some(4));
        assert_eq!(opts.build_path, Some(PathBuf::from("build")));
    }

    #[test]
    fn rejects_positional() {
        let result = get_arg_parser().try_get_matches_from(["tidy-runner", "src/a.cpp"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_jobs() {
        let result = get_arg_parser().try_get_matches_from(["tidy-runner", "-j", "many"]);
        assert!(result.is_err());
    }
}
