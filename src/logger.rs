//! The runner's own log output.
//!
//! Records are printed to stdout as `LEVEL: message`, interleaved with whatever
//! run-clang-tidy prints. Only the child's output is ever scanned for diagnostics.

// non-std crates
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// Prints every record at or above debug level to stdout.
struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// The logger registered with the `log` facade by [`init`].
static LOGGER: SimpleLogger = SimpleLogger;

/// Registers the runner's logger and sets the max level to [`LevelFilter::Info`].
///
/// Fails with a [`SetLoggerError`] when a logger is already registered, which
/// [`crate::run::run_main`] tolerates.
pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Info))
}

/// Picks the max log level from the `--verbosity` value and the CI runner's
/// `ACTIONS_STEP_DEBUG` variable. Either one asking for debug output wins.
pub fn level_from(verbosity: &str, step_debug: Option<&str>) -> LevelFilter {
    if verbosity == "debug" || step_debug == Some("true") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Opens a collapsible section in a GitHub Actions log, e.g. around file discovery.
pub fn start_log_group(name: String) {
    println!("::group::{}", name);
}

/// Closes the section opened by [`start_log_group`].
pub fn end_log_group() {
    println!("::endgroup::");
}
