//! Depth-first tree walk.
//!
//! Each directory is read to completion and its handle closed before any of
//! its entries is touched. Entries are then handled in the order the
//! filesystem yielded them:
//!
//! - regular file: handed to [`crate::handler`]
//! - directory: walked recursively, then renamed with the directory rule
//! - anything else (symlinks, devices, sockets): skipped
//!
//! A directory is renamed only after everything beneath it, and only when:
//!
//! - it is not the root of the walk (`skip_self_rename`),
//! - no output root is set (output mode never renames), and
//! - nothing beneath it failed, so a rerun still finds the leftovers under the
//!   old name.
//!
//! Failures never unwind. Every level returns a [`Tally`] that its caller
//! merges, and every rename, copy, skip, and failure is passed to the
//! observer as a [`WalkEvent`] at the moment it happens.

use crate::codec::{self, Direction, NameKind};
use crate::fs::{DirEntry, EntryKind, Filesystem};
use crate::handler::{self, FileContext, FileOutcome};
use crate::paths::{self, PathBytes};
use crate::report::{EntryError, FsOp, Tally, WalkEvent};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Walk state shared by every level of one recursion.
pub struct Walker<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    direction: Direction,
    ctx: FileContext,
    observer: &'a mut dyn FnMut(&WalkEvent),
}

impl<'a, F: Filesystem + ?Sized> Walker<'a, F> {
    pub fn new(
        fs: &'a F,
        direction: Direction,
        ctx: FileContext,
        observer: &'a mut dyn FnMut(&WalkEvent),
    ) -> Self {
        Self {
            fs,
            direction,
            ctx,
            observer,
        }
    }

    /// Process everything under `dir`, then rename `dir` itself unless told
    /// not to.
    pub fn walk(&mut self, dir: &Path, skip_self_rename: bool) -> Tally {
        let mut tally = self.process_directory(dir);

        if skip_self_rename || self.ctx.output_root.is_some() {
            return tally;
        }
        if !tally.is_clean() {
            debug!(dir = %dir.display(), "keeping directory name after failures below it");
            return tally;
        }
        tally += self.rename_directory(dir);
        tally
    }

    /// Read all of `dir`, close it, then process each entry.
    pub fn process_directory(&mut self, dir: &Path) -> Tally {
        debug!(dir = %dir.display(), "entering directory");
        let entries: Vec<io::Result<DirEntry>> = match self.fs.open_dir(dir) {
            Ok(handle) => handle.collect(),
            Err(e) => return self.fail(EntryError::io(FsOp::OpenDir, dir, e)),
        };

        let mut tally = Tally::default();
        for entry in entries {
            tally += self.process_entry(dir, entry);
        }
        tally
    }

    fn process_entry(&mut self, dir: &Path, entry: io::Result<DirEntry>) -> Tally {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return self.fail(EntryError::io(FsOp::ReadEntry, dir, e)),
        };
        if entry.name == "." || entry.name == ".." {
            return Tally::default();
        }

        let path = match paths::join(dir, &entry.name) {
            Ok(path) => path,
            Err(e) => {
                let shown = dir.join(&entry.name);
                return self.fail(EntryError::too_long(&shown, e));
            }
        };
        trace!(path = %path.display(), kind = ?entry.kind, "entry");

        match entry.kind {
            EntryKind::File => self.process_file(&path),
            EntryKind::Directory => {
                if self.is_output_root(&path) {
                    debug!(path = %path.display(), "skipping output directory");
                    return self.skip(path);
                }
                self.walk(&path, false)
            }
            EntryKind::Other => {
                debug!(path = %path.display(), "skipping non-regular entry");
                self.skip(path)
            }
        }
    }

    fn process_file(&mut self, path: &Path) -> Tally {
        match handler::process_file(self.fs, &self.ctx, path, self.direction) {
            Ok(FileOutcome::Unchanged) => {
                self.emit(WalkEvent::Unchanged {
                    path: path.to_path_buf(),
                });
                Tally::unchanged()
            }
            Ok(FileOutcome::Renamed { from, to }) => {
                self.emit(WalkEvent::Renamed {
                    kind: NameKind::File,
                    from,
                    to,
                });
                Tally::renamed()
            }
            Ok(FileOutcome::Copied { from, to }) => {
                self.emit(WalkEvent::Copied { from, to });
                Tally::copied()
            }
            Err(e) => self.fail(e),
        }
    }

    /// Apply the directory rule to the last component of `dir`.
    fn rename_directory(&mut self, dir: &Path) -> Tally {
        let (Some(parent), Some(name)) = (dir.parent(), dir.file_name()) else {
            return Tally::default();
        };
        let renamed = codec::transform(&paths::os_bytes(name), self.direction, NameKind::Directory)
            .and_then(|name| PathBytes::from_path(parent)?.join(name.as_bytes()));
        let to = match renamed {
            Ok(to) => to.to_path_buf(),
            Err(e) => return self.fail(EntryError::too_long(dir, e)),
        };

        if to.as_path() == dir {
            debug!(dir = %dir.display(), "directory name unchanged");
            self.emit(WalkEvent::Unchanged {
                path: dir.to_path_buf(),
            });
            return Tally::unchanged();
        }

        match self.fs.rename(dir, &to) {
            Ok(()) => {
                self.emit(WalkEvent::Renamed {
                    kind: NameKind::Directory,
                    from: dir.to_path_buf(),
                    to,
                });
                Tally::renamed()
            }
            Err(e) => self.fail(EntryError::io(FsOp::Rename, dir, e)),
        }
    }

    /// Only answers in output mode; resolution failures are left for the
    /// recursive walk to report.
    fn is_output_root(&self, dir: &Path) -> bool {
        let Some(root) = &self.ctx.output_root else {
            return false;
        };
        self.fs
            .resolve_absolute(dir)
            .is_ok_and(|resolved| resolved == *root)
    }

    fn skip(&mut self, path: PathBuf) -> Tally {
        self.emit(WalkEvent::Skipped { path });
        Tally::skipped()
    }

    fn fail(&mut self, err: EntryError) -> Tally {
        let tally = Tally::failure(err.path());
        self.emit(WalkEvent::Failed(err));
        tally
    }

    fn emit(&mut self, event: WalkEvent) {
        (self.observer)(&event);
    }
}

/// Walk `dir` with a fresh [`Walker`].
///
/// In-place encoded files land directly in `dir`. `output_root`, when given,
/// should already be absolute and canonical so the walk can recognise it if
/// it lies inside `dir`.
pub fn walk<F: Filesystem + ?Sized>(
    fs: &F,
    dir: &Path,
    direction: Direction,
    skip_self_rename: bool,
    output_root: Option<&Path>,
    observer: &mut dyn FnMut(&WalkEvent),
) -> Tally {
    let ctx = FileContext {
        anchor: dir.to_path_buf(),
        output_root: output_root.map(Path::to_path_buf),
        dir_mode: crate::config::DEFAULT_DIR_MODE,
    };
    Walker::new(fs, direction, ctx, observer).walk(dir, skip_self_rename)
}
