//! Per-entry failures, walk events, and the accumulating run tally.
//!
//! A walk never unwinds on a bad entry. Each recursion level returns a
//! [`Tally`] to its caller, which merges it into its own; a failure is an
//! [`EntryError`] reported through a [`WalkEvent::Failed`] and one increment of
//! [`Tally::failed`].

use crate::codec::NameKind;
use crate::paths::PathTooLong;
use std::fmt;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The filesystem call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    OpenDir,
    ReadEntry,
    Resolve,
    MakeDir,
    Rename,
    Copy,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenDir => "open directory",
            Self::ReadEntry => "read entry in",
            Self::Resolve => "resolve",
            Self::MakeDir => "create directory",
            Self::Rename => "rename",
            Self::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// Failure of one entry. Never fatal to the walk.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("{}: {source}", .path.display())]
    PathTooLong {
        path: PathBuf,
        #[source]
        source: PathTooLong,
    },
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EntryError {
    pub fn io(op: FsOp, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn too_long(path: &Path, source: PathTooLong) -> Self {
        Self::PathTooLong {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path the failure is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::PathTooLong { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// Something that happened during a walk, in the order it happened.
#[derive(Debug)]
pub enum WalkEvent {
    Renamed {
        kind: NameKind,
        from: PathBuf,
        to: PathBuf,
    },
    Copied {
        from: PathBuf,
        to: PathBuf,
    },
    /// The codec left the name as it was; no call was made.
    Unchanged { path: PathBuf },
    /// Not a regular file or directory, or the output root itself.
    Skipped { path: PathBuf },
    Failed(EntryError),
}

/// Counters returned by every level of the walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub renamed: u64,
    pub copied: u64,
    pub unchanged: u64,
    pub skipped: u64,
    pub failed: u64,
    /// The first failing path, kept while siblings carry on.
    pub first_failure: Option<PathBuf>,
}

impl Tally {
    pub fn renamed() -> Self {
        Self {
            renamed: 1,
            ..Self::default()
        }
    }

    pub fn copied() -> Self {
        Self {
            copied: 1,
            ..Self::default()
        }
    }

    pub fn unchanged() -> Self {
        Self {
            unchanged: 1,
            ..Self::default()
        }
    }

    pub fn skipped() -> Self {
        Self {
            skipped: 1,
            ..Self::default()
        }
    }

    pub fn failure(path: &Path) -> Self {
        Self {
            failed: 1,
            first_failure: Some(path.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.renamed += other.renamed;
        self.copied += other.copied;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.failed += other.failed;
        if self.first_failure.is_none() {
            self.first_failure = other.first_failure;
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "renamed={} copied={} unchanged={} skipped={} failed={}",
            self.renamed, self.copied, self.unchanged, self.skipped, self.failed
        )
    }
}
