//! This module runs the assembled run-clang-tidy command in one of two modes.
//!
//! - pass-through: the child inherits stdio and its exit code is returned as is.
//! - check-output: the child's stdout and stderr are merged, relayed line by line,
//!   and scanned for diagnostics to decide the exit code.

use std::io::{self, BufRead, BufReader, Write};
use std::process::Command;

// project-specific modules/crates
use crate::error::RunnerError;

/// Substrings that mark a line of clang-tidy output as a diagnostic.
pub const DIAGNOSTIC_MARKERS: [&str; 2] = ["warning:", "error:"];

/// Describes if the `line` looks like a clang-tidy warning or error.
///
/// This is a plain substring test, so it also fires on unrelated output that
/// happens to contain one of the [`DIAGNOSTIC_MARKERS`].
pub fn is_diagnostic(line: &str) -> bool {
    DIAGNOSTIC_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Decides the exit code in check-output mode.
///
/// A non-zero exit code of the child wins. Otherwise (zero, or no code because the
/// child was killed by a signal) the result is 1 if a diagnostic was seen, else 0.
pub fn check_output_exit_code(child_code: Option<i32>, found_diagnostic: bool) -> i32 {
    match child_code {
        Some(code) if code != 0 => code,
        _ => i32::from(found_diagnostic),
    }
}

/// Copies every line from `reader` to `out` unchanged and reports whether any line
/// was a diagnostic.
///
/// Lines are handled as bytes so output that isn't valid UTF-8 is relayed intact.
/// `out` is flushed after each line to keep the output streaming.
pub fn scan_output<R: BufRead, W: Write>(mut reader: R, out: &mut W) -> io::Result<bool> {
    let mut found = false;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        out.write_all(&line)?;
        out.flush()?;
        if !found && is_diagnostic(&String::from_utf8_lossy(&line)) {
            found = true;
        }
    }
    Ok(found)
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().to_string()
}

fn log_command(cmd: &Command) {
    log::info!(
        "Running \"{} {}\"",
        cmd.get_program().to_string_lossy(),
        cmd.get_args()
            .map(|x| x.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
}

/// Runs `cmd` with inherited stdio and returns the child's exit code.
///
/// A child terminated by a signal has no exit code; that is reported as 1.
pub fn run_pass_through(mut cmd: Command) -> Result<i32, RunnerError> {
    log_command(&cmd);
    let status = cmd.status().map_err(|source| RunnerError::Launch {
        program: program_name(&cmd),
        source,
    })?;
    match status.code() {
        Some(code) => Ok(code),
        None => {
            log::warn!("{} was terminated by a signal", program_name(&cmd));
            Ok(1)
        }
    }
}

/// Runs `cmd` with stdout and stderr merged into one pipe, relays the output to `out`
/// and returns the exit code decided by [`check_output_exit_code`].
pub fn run_check_output<W: Write>(mut cmd: Command, out: &mut W) -> Result<i32, RunnerError> {
    log_command(&cmd);
    let program = program_name(&cmd);
    let (reader, writer) = io::pipe()?;
    cmd.stdout(writer.try_clone()?).stderr(writer);
    let mut child = cmd
        .spawn()
        .map_err(|source| RunnerError::Launch { program, source })?;
    // `cmd` still owns the parent's copies of the write ends; the reader only sees
    // EOF once they are closed.
    drop(cmd);

    let found = match scan_output(BufReader::new(reader), out) {
        Ok(found) => found,
        Err(e) => {
            // nobody drains the pipe anymore, so the child could block forever
            if let Err(kill_err) = child.kill() {
                log::debug!("Could not kill run-clang-tidy: {kill_err}");
            }
            child.wait()?;
            return Err(e.into());
        }
    };
    let status = child.wait()?;
    log::debug!("run-clang-tidy exited with {status}");
    Ok(check_output_exit_code(status.code(), found))
}
