//! A module to hold all common file system functionality.
//!
//! This covers deciding which committed files are C/C++ sources and which of those
//! are excluded by the repository's ignore file.

use std::path::{Component, Path, PathBuf};
use std::{fs, io};

// non-std crates
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

// project specific modules/crates
use crate::error::RunnerError;

/// The file extensions (without the leading `.`) that are considered C/C++ sources.
pub const CPP_EXTENSIONS: [&str; 8] = ["cpp", "hpp", "cxx", "hxx", "hh", "cc", "h", "c"];

/// Describes if the given repo-relative `file_name` uses one of the [`CPP_EXTENSIONS`].
///
/// Only the final extension counts and the comparison is case-sensitive, so
/// `lib.c.bak` and `main.CPP` are not sources. A dot-file such as `.c` has no
/// extension at all.
pub fn is_source_file(file_name: &str) -> bool {
    match Path::new(file_name).extension() {
        Some(ext) => CPP_EXTENSIONS.iter().any(|allowed| ext == *allowed),
        None => false,
    }
}

/// The compiled glob patterns read from an ignore file.
#[derive(Debug, Clone)]
pub struct IgnoreGlobs {
    /// The patterns as they were written in the ignore file.
    pub patterns: Vec<String>,
    set: GlobSet,
}

impl Default for IgnoreGlobs {
    fn default() -> Self {
        IgnoreGlobs {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

/// Rewrites an `fnmatch` pattern into globset syntax.
///
/// `fnmatch` has no alternation, so `{` and `}` become the single-character classes
/// `[{]` and `[}]`. A `[` without a closing `]` is a literal `[`. Classes are copied
/// as is; a `]` right after `[` or `[!` belongs to the class.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut glob = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' => glob.push_str("[{]"),
            '}' => glob.push_str("[}]"),
            '[' => {
                let mut end = i + 1;
                if chars.get(end) == Some(&'!') {
                    end += 1;
                }
                if chars.get(end) == Some(&']') {
                    end += 1;
                }
                match chars[end.min(chars.len())..].iter().position(|c| *c == ']') {
                    Some(offset) => {
                        let close = end + offset;
                        glob.extend(&chars[i..=close]);
                        i = close;
                    }
                    None => glob.push_str("[[]"),
                }
            }
            c => glob.push(c),
        }
        i += 1;
    }
    glob
}

impl IgnoreGlobs {
    /// Compiles the given `patterns` with `fnmatch` semantics.
    ///
    /// Matching is over the whole relative path: `*` and `?` also match `/`, so
    /// `vendor/*` covers every file below `vendor/`. Braces and backslashes are
    /// literal characters. A pattern that still fails to compile is matched as
    /// literal text, so the contents of an ignore file never abort a run.
    pub fn new(patterns: Vec<String>) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = GlobBuilder::new(&fnmatch_to_glob(pattern))
                .literal_separator(false)
                .backslash_escape(false)
                .allow_unclosed_class(true)
                .build()
                .or_else(|e| {
                    log::warn!("Ignore pattern {pattern:?} is matched literally: {e}");
                    GlobBuilder::new(&globset::escape(pattern))
                        .literal_separator(false)
                        .build()
                });
            match glob {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => log::warn!("Ignore pattern {pattern:?} is skipped: {e}"),
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            log::warn!("Ignore patterns could not be combined, nothing is ignored: {e}");
            GlobSet::empty()
        });
        IgnoreGlobs { patterns, set }
    }

    /// Parses the contents of an ignore file: one pattern per line.
    ///
    /// Surrounding whitespace is trimmed. Blank lines and lines starting with `#`
    /// are skipped.
    pub fn parse(contents: &str) -> Self {
        let patterns = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect::<Vec<_>>();
        Self::new(patterns)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Describes if the repo-relative `file_name` matches any of the patterns.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        let matches = self.set.matches(file_name);
        if let Some(first) = matches.first() {
            log::debug!(
                "{} is ignored as specified via {:?}",
                file_name,
                self.patterns[*first]
            );
            return true;
        }
        false
    }
}

/// Reads the ignore file at `path`.
///
/// A missing file is not an error; it just means nothing is ignored.
pub fn read_ignore_globs(path: &Path) -> Result<IgnoreGlobs, RunnerError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let globs = IgnoreGlobs::parse(&contents);
            if !globs.is_empty() {
                log::info!("Ignored:");
                for pattern in &globs.patterns {
                    log::info!("  {pattern}");
                }
            }
            Ok(globs)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No ignore file found at {}", path.to_string_lossy());
            Ok(IgnoreGlobs::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Keeps the `files` that are C/C++ sources and not ignored, preserving their order.
pub fn filter_source_files(files: &[String], ignore: &IgnoreGlobs) -> Vec<String> {
    files
        .iter()
        .filter(|name| is_source_file(name) && !ignore.is_ignored(name))
        .cloned()
        .collect()
}

/// Resolves `.` and `..` components lexically, without touching the file system.
///
/// This was copied from [cargo source code](https://github.com/rust-lang/cargo/blob/fede83ccf973457de319ba6fa0e36ead454d2e20/src/cargo/util/paths.rs#L61).
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => unreachable!(),
            Component::RootDir => {
                ret.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => {
                ret.push(c);
            }
        }
    }
    ret
}
