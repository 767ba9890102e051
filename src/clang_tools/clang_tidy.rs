//! This module holds functionality specific to the compilation database clang-tidy
//! reads from the build directory.
//!
//! run-clang-tidy only analyzes files that have an entry in the database, so files
//! without one (typically headers) are silently skipped by it. The check here only
//! reports those files; it never changes what gets passed to run-clang-tidy.

use std::{
    fs,
    path::{Path, PathBuf},
};

// non-std crates
use serde::Deserialize;

// project-specific modules/crates
use crate::common_fs::normalize_path;

/// The name of the JSON compilation database within a build directory.
pub const COMPILE_COMMANDS: &str = "compile_commands.json";

/// Used to deserialize a JSON compilation database.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct CompilationDatabase {
    /// A list of [`CompilationUnit`]
    units: Vec<CompilationUnit>,
}

/// Used to deserialize a json compilation database's translation unit.
///
/// The only purpose this serves is to normalize relative paths for build systems that
/// use/need relative paths (ie ninja).
#[derive(Deserialize, Debug)]
struct CompilationUnit {
    /// The directory of the build environment
    directory: String,

    /// The file path of the translation unit.
    ///
    /// Sometimes, this is relative to the build [`CompilationUnit::directory`].
    file: String,
}

impl CompilationDatabase {
    /// Parses the database from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the absolute, normalized path of every translation unit.
    fn unit_paths(&self) -> Vec<PathBuf> {
        self.units
            .iter()
            .map(|unit| normalize_path(&PathBuf::from_iter([&unit.directory, &unit.file])))
            .collect()
    }

    /// Lists the repo-relative `files` under `repo_root` that have no translation unit.
    pub fn files_without_unit<'a>(&self, repo_root: &Path, files: &'a [String]) -> Vec<&'a str> {
        let units = self.unit_paths();
        let root = normalize_path(repo_root);
        files
            .iter()
            .filter(|name| !units.contains(&root.join(name.as_str())))
            .map(String::as_str)
            .collect()
    }
}

/// Reads `compile_commands.json` from `build_path` and logs the `files` it doesn't cover.
///
/// A missing or malformed database only produces a warning.
pub fn check_compilation_database(build_path: &Path, repo_root: &Path, files: &[String]) {
    let db_path = build_path.join(COMPILE_COMMANDS);
    let db_str = match fs::read_to_string(&db_path) {
        Ok(db_str) => db_str,
        Err(e) => {
            log::warn!(
                "Could not read {} ({e}); run-clang-tidy will likely fail",
                db_path.to_string_lossy()
            );
            return;
        }
    };
    match CompilationDatabase::from_json(&db_str) {
        Ok(db) => {
            log::debug!(
                "{} lists {} translation units",
                db_path.to_string_lossy(),
                db.len()
            );
            for name in db.files_without_unit(repo_root, files) {
                log::debug!("{name} has no entry in {COMPILE_COMMANDS}");
            }
        }
        Err(e) => log::warn!("Could not parse {}: {e}", db_path.to_string_lossy()),
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::CompilationDatabase;

    const DB: &str = r#"[
        {"directory": "/repo/build", "command": "c++ -c ../src/a.cpp", "file": "../src/a.cpp"},
        {"directory": "/repo/build", "arguments": ["cc", "-c", "/repo/src/b.c"], "file": "/repo/src/b.c", "output": "b.o"}
    ]"#;

    #[test]
    fn parse_database() {
        let db = CompilationDatabase::from_json(DB).unwrap();
        assert_eq!(db.len(), 2);
        assert!(!db.is_empty());
    }

    #[test]
    fn headers_have_no_unit() {
        let db = CompilationDatabase::from_json(DB).unwrap();
        let files = vec![
            "src/a.cpp".to_string(),
            "src/a.hpp".to_string(),
            "src/b.c".to_string(),
        ];
        assert_eq!(
            db.files_without_unit(Path::new("/repo"), &files),
            ["src/a.hpp"]
        );
    }

    #[test]
    fn malformed_database() {
        assert!(CompilationDatabase::from_json("{\"not\": \"a list\"}").is_err());
    }
}
