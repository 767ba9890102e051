//! This module queries git for the repository root and the list of committed files.
//!
//! Everything goes through libgit2 (via the `git2` crate), so no `git` executable
//! is required on the `$PATH`.

use std::path::{Path, PathBuf};

// non-std crates
use git2::{ErrorCode, ObjectType, Repository, TreeWalkMode, TreeWalkResult};

// project specific modules/crates
use crate::error::RunnerError;

/// Opens the repository that contains the given `path`.
///
/// Like `git rev-parse`, this searches upward from `path` through parent directories.
pub fn open_repo(path: &Path) -> Result<Repository, RunnerError> {
    Ok(Repository::discover(path)?)
}

/// Returns the root of the `repo`'s work tree.
pub fn get_repo_root(repo: &Repository) -> Result<PathBuf, RunnerError> {
    match repo.workdir() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Err(RunnerError::BareRepository(
            repo.path().to_string_lossy().to_string(),
        )),
    }
}

/// Lists the files committed at `HEAD`, relative to the repository root.
///
/// Paths always use `/` as separator. The order is the pre-order walk of the `HEAD`
/// tree, which is the sorted order `git ls-tree -r` would print.
///
/// A repository without any commits yields an empty list.
pub fn list_committed_files(repo: &Repository) -> Result<Vec<String>, RunnerError> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            log::warn!("HEAD does not point to a commit yet; no files are committed");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let tree = head.peel_to_tree()?;
    let mut files = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            match entry.name() {
                Some(name) => files.push(format!("{dir}{name}")),
                None => log::warn!(
                    "Skipping {}{}: file name is not valid UTF-8",
                    dir,
                    String::from_utf8_lossy(entry.name_bytes())
                ),
            }
        }
        TreeWalkResult::Ok
    })?;
    log::debug!("Found {} committed files", files.len());
    Ok(files)
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use git2::{Repository, Signature};
    use tempfile::TempDir;

    use super::{get_repo_root, list_committed_files, open_repo};

    /// Creates a repository in a temp directory, writes the `committed` files, commits
    /// them, then writes the `uncommitted` files without adding them.
    fn make_repo(committed: &[&str], uncommitted: &[&str]) -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        for name in committed.iter().chain(uncommitted) {
            let path = tmp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "int main() { return 0; }\n").unwrap();
        }
        if !committed.is_empty() {
            let mut index = repo.index().unwrap();
            for name in committed {
                index.add_path(Path::new(name)).unwrap();
            }
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("tidy-runner", "tidy-runner@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        tmp
    }

    #[test]
    fn lists_only_committed() {
        let tmp = make_repo(
            &["src/a.cpp", "include/a.hpp", "README.md"],
            &["src/scratch.cpp"],
        );
        let repo = open_repo(tmp.path()).unwrap();
        let files = list_committed_files(&repo).unwrap();
        assert_eq!(files, ["README.md", "include/a.hpp", "src/a.cpp"]);
    }

    #[test]
    fn discovers_root_from_subdir() {
        let tmp = make_repo(&["src/a.cpp"], &[]);
        let repo = open_repo(&tmp.path().join("src")).unwrap();
        let root = get_repo_root(&repo).unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn unborn_head_is_empty() {
        let tmp = make_repo(&[], &["src/a.cpp"]);
        let repo = open_repo(tmp.path()).unwrap();
        assert!(list_committed_files(&repo).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn skips_non_utf8_names() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let tmp = tempfile::tempdir().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let blob = repo.blob(b"int x;\n").unwrap();
        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert("a.cpp", blob, 0o100644).unwrap();
        builder
            .insert(Path::new(OsStr::from_bytes(b"bad\xff.cpp")), blob, 0o100644)
            .unwrap();
        builder.insert("b.h", blob, 0o100644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();
        let sig = Signature::now("tidy-runner", "tidy-runner@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();

        let files = list_committed_files(&repo).unwrap();
        assert_eq!(files, ["a.cpp", "b.h"]);
    }
}
