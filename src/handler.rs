//! Per-file work: compute the destination name, then rename or copy.
//!
//! ## Destinations
//!
//! | Mode | Source name fed to the codec | Destination |
//! |------|------------------------------|-------------|
//! | encode, in place | canonical absolute path | `<anchor>/<encoded>` |
//! | encode, output | canonical absolute path | `<output_root>/<encoded>` (copy) |
//! | decode | the entry's own name | `<entry's directory>/<decoded>` |
//!
//! The anchor is the root of the walk. Encoding flattens the whole absolute
//! path into one name, so every encoded file lands directly in the anchor (or
//! the output root). Decoding may re-introduce separators; the directories
//! they name are created first.
//!
//! A destination equal to its source is a no-op: no filesystem call is made.

use crate::codec::{self, Direction, NameKind};
use crate::fs::Filesystem;
use crate::paths::{self, PathBytes, PathTooLong};
use crate::report::{EntryError, FsOp};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed inputs for every file of one walk.
#[derive(Debug, Clone)]
pub struct FileContext {
    /// Directory that receives in-place encoded files.
    pub anchor: PathBuf,
    /// Copy destination. `None` means rename in place.
    pub output_root: Option<PathBuf>,
    /// Mode for directories created on the way.
    pub dir_mode: u32,
}

impl FileContext {
    pub fn in_place(anchor: impl Into<PathBuf>, dir_mode: u32) -> Self {
        Self {
            anchor: anchor.into(),
            output_root: None,
            dir_mode,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Renamed { from: PathBuf, to: PathBuf },
    Copied { from: PathBuf, to: PathBuf },
}

/// Rename `path` to its transformed name, or copy it when an output root is
/// set.
///
/// The output root only applies when encoding; decoding always renames.
pub fn process_file<F: Filesystem + ?Sized>(
    fs: &F,
    ctx: &FileContext,
    path: &Path,
    direction: Direction,
) -> Result<FileOutcome, EntryError> {
    let dest = match (direction, &ctx.output_root) {
        (Direction::Encode, Some(output_root)) => {
            return process_file_output(fs, ctx, path, output_root);
        }
        (Direction::Encode, None) => encoded_under(fs, path, &ctx.anchor)?,
        (Direction::Decode, _) => decoded_beside(path)?,
    };

    if dest.as_path() == path {
        debug!(path = %path.display(), "name unchanged");
        return Ok(FileOutcome::Unchanged);
    }

    if direction == Direction::Decode {
        ensure_parent(fs, path, &dest, ctx.dir_mode)?;
    }

    fs.rename(path, &dest)
        .map_err(|e| EntryError::io(FsOp::Rename, path, e))?;
    Ok(FileOutcome::Renamed {
        from: path.to_path_buf(),
        to: dest,
    })
}

/// Copy `path` to `<output_root>/<encoded absolute path>`.
///
/// The source is only read.
pub fn process_file_output<F: Filesystem + ?Sized>(
    fs: &F,
    ctx: &FileContext,
    path: &Path,
    output_root: &Path,
) -> Result<FileOutcome, EntryError> {
    let dest = encoded_under(fs, path, output_root)?;
    ensure_parent(fs, path, &dest, ctx.dir_mode)?;
    fs.copy_bytes(path, &dest)
        .map_err(|e| EntryError::io(FsOp::Copy, path, e))?;
    Ok(FileOutcome::Copied {
        from: path.to_path_buf(),
        to: dest,
    })
}

/// `<dir>/<file-encoded canonical path of source>`.
fn encoded_under<F: Filesystem + ?Sized>(
    fs: &F,
    source: &Path,
    dir: &Path,
) -> Result<PathBuf, EntryError> {
    let absolute = fs
        .resolve_absolute(source)
        .map_err(|e| EntryError::io(FsOp::Resolve, source, e))?;
    let too_long = |e: PathTooLong| EntryError::too_long(source, e);

    let name = codec::transform(
        &paths::os_bytes(absolute.as_os_str()),
        Direction::Encode,
        NameKind::File,
    )
    .map_err(too_long)?;
    Ok(PathBytes::from_path(dir)
        .and_then(|d| d.join(name.as_bytes()))
        .map_err(too_long)?
        .to_path_buf())
}

/// The entry's name decoded and placed back in the entry's own directory.
fn decoded_beside(source: &Path) -> Result<PathBuf, EntryError> {
    let Some(name) = source.file_name() else {
        return Ok(source.to_path_buf());
    };
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    let too_long = |e: PathTooLong| EntryError::too_long(source, e);

    let decoded = codec::transform(&paths::os_bytes(name), Direction::Decode, NameKind::File)
        .map_err(too_long)?;
    Ok(PathBytes::from_path(parent)
        .and_then(|p| p.join(decoded.as_bytes()))
        .map_err(too_long)?
        .to_path_buf())
}

/// Create the destination's directory unless it is the one the source is
/// already in.
fn ensure_parent<F: Filesystem + ?Sized>(
    fs: &F,
    source: &Path,
    dest: &Path,
    mode: u32,
) -> Result<(), EntryError> {
    let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if source.parent() == Some(parent) {
        return Ok(());
    }
    fs.make_dir_recursive(parent, mode)
        .map_err(|e| EntryError::io(FsOp::MakeDir, parent, e))
}
