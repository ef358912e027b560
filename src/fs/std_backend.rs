//! [`Filesystem`] backed by `std::fs`.
//!
//! | Capability | Call |
//! |---|---|
//! | open / next / close | `fs::read_dir`, iterator, drop |
//! | stat | `fs::metadata` |
//! | mkdir -p | `fs::DirBuilder` (recursive, mode on Unix) |
//! | realpath | `fs::canonicalize` |
//! | rename | `fs::rename` |
//! | copy | `io::copy` between two scoped `File` handles |
//!
//! `fs::rename` already replaces an existing destination file on Windows, so
//! no pre-removal step is needed there.

use super::backend::{DirEntries, DirEntry, EntryKind, Filesystem};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct StdFs;

impl Filesystem for StdFs {
    fn open_dir(&self, path: &Path) -> io::Result<DirEntries<'_>> {
        let read_dir = fs::read_dir(path)?;
        Ok(Box::new(read_dir.map(|entry| -> io::Result<DirEntry> {
            let entry = entry?;
            let kind = EntryKind::from_file_type(entry.file_type()?);
            Ok(DirEntry {
                name: entry.file_name(),
                kind,
            })
        })))
    }

    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        Ok(EntryKind::from_file_type(fs::metadata(path)?.file_type()))
    }

    fn make_dir_recursive(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path)
    }

    fn resolve_absolute(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path).map(strip_verbatim_prefix)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn copy_bytes(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut source = fs::File::open(from)?;
        let dest = fs::File::create(to)?;
        let result = write_all_from(&mut source, dest);
        if result.is_err() {
            // No truncated copy is left behind
            let _ = fs::remove_file(to);
        }
        result
    }
}

/// Buffered copy; the destination handle is dropped before returning so a
/// failed copy can be removed.
fn write_all_from<R: io::Read>(source: &mut R, dest: fs::File) -> io::Result<u64> {
    let mut dest = io::BufWriter::new(dest);
    let copied = io::copy(source, &mut dest)?;
    dest.flush()?;
    Ok(copied)
}

/// `canonicalize` on Windows returns `\\?\C:\...`; keep the plain drive form
/// so flattened names stay valid file names.
#[cfg(windows)]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(rest) if !rest.starts_with("UNC\\") => PathBuf::from(rest),
        _ => path,
    }
}

#[cfg(not(windows))]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    path
}
