//! Shared test utilities.
//!
//! Fixture trees are built in a fresh [`TempDir`] from `(relative path,
//! contents)` pairs, and compared as sorted snapshots of every file they
//! hold.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = build_tree(&[("proj/My Docs/a b.txt", "payload")]);
//! let before = snapshot(tmp.path());
//! // ... run a walk ...
//! assert_eq!(snapshot(tmp.path()), before);
//!
//! let flat = find_entry_ending(tmp.path(), "@My_Docs@a_b.txt");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp directory holding the given files.
///
/// Parent directories are created as needed. Contents are written verbatim.
pub fn build_tree(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
    }
    tmp
}

// =========================================================================
// Snapshots
// =========================================================================

/// Every regular file under `root`, keyed by path relative to `root`.
///
/// Symlinks are not followed and not included.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(entry.path()).unwrap())
        })
        .collect()
}

// =========================================================================
// Lookups - panic with a clear message on miss
// =========================================================================

/// Names of the entries directly inside `dir`, sorted.
pub fn entry_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// The single entry in `dir` whose name ends with `suffix`. Panics if there
/// is none or more than one.
pub fn find_entry_ending(dir: &Path, suffix: &str) -> PathBuf {
    let names = entry_names(dir);
    let matches: Vec<&String> = names.iter().filter(|n| n.ends_with(suffix)).collect();
    match matches.as_slice() {
        [name] => dir.join(name.as_str()),
        [] => panic!("no entry ending in '{suffix}' in {}. Available: {names:?}", dir.display()),
        _ => panic!("several entries end in '{suffix}': {matches:?}"),
    }
}
