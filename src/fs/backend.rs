//! Filesystem capability trait and shared types.
//!
//! The [`Filesystem`] trait is the only way the walker and file handler touch
//! the disk. The production implementation is
//! [`StdFs`](super::std_backend::StdFs); tests swap in a recording wrapper
//! that logs every call and can inject failures at chosen paths.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Classification of a directory entry. Symlinks are [`EntryKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Other
        } else if file_type.is_file() {
            Self::File
        } else if file_type.is_dir() {
            Self::Directory
        } else {
            Self::Other
        }
    }
}

/// One entry yielded while iterating a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

/// An open directory handle. Dropping it closes the handle.
pub type DirEntries<'a> = Box<dyn Iterator<Item = io::Result<DirEntry>> + 'a>;

/// Everything the tree walker needs from a filesystem.
pub trait Filesystem {
    /// Open a directory for iteration.
    ///
    /// An `Err` item means that one entry could not be read; iteration may
    /// continue past it.
    fn open_dir(&self, path: &Path) -> io::Result<DirEntries<'_>>;

    /// Kind of the object at `path`, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<EntryKind>;

    /// `mkdir -p`. Succeeds when `path` is already a directory.
    fn make_dir_recursive(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Absolute, canonical form of `path`.
    fn resolve_absolute(&self, path: &Path) -> io::Result<PathBuf>;

    /// Rename, replacing an existing destination file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Whole-file binary copy. Returns the number of bytes written.
    fn copy_bytes(&self, from: &Path, to: &Path) -> io::Result<u64>;
}
