//! # filinator
//!
//! Reversible renaming of whole directory trees, so that names containing
//! spaces and path separators survive tools that mangle them.
//!
//! Encoding flattens each file's absolute path into one name (`/` → `@`,
//! space → `_`) and marks spaces in directory names with a single sentinel
//! byte. Decoding turns the names back into paths and recreates the
//! directories they describe.
//!
//! ```text
//! proj/My Docs/a b.txt
//!     encode, in place →  proj/@home@me@proj@My_Docs@a_b.txt
//!                         proj/My§Docs/
//!     decode           →  proj/home/me/proj/My Docs/a b.txt
//!                         proj/My Docs/
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | Pure byte-level encode/decode rules for file and directory names |
//! | [`paths`] | Length-checked path bytes, joining, and OS string conversion |
//! | [`fs`] | The `Filesystem` capability trait and its `std::fs` backend |
//! | [`handler`] | One file: compute its destination, then rename or copy |
//! | [`walk`] | Post-order tree walk with best-effort failure accounting |
//! | [`report`] | Per-entry errors, walk events, and the run tally |
//! | [`session`] | Run configuration, output directory setup, top-level walk |
//! | [`config`] | `filinator.toml` loading and validation |
//! | [`output`] | CLI line formatting for events, errors, and notices |
//!
//! # Design Decisions
//!
//! ## Post-Order, Read-Ahead Walk
//!
//! A directory is renamed only after everything under it has been handled;
//! renaming it first would invalidate the paths of its descendants. Each
//! directory is also read to completion before any entry is touched, so
//! files that an in-place encode moves into the walk root are not picked up
//! again by the same run.
//!
//! ## Keep Going, Count Failures
//!
//! No single entry can stop a walk. Every level returns a [`report::Tally`],
//! the caller merges it, and the process exit status is the tally reduced to
//! clean or not. A directory whose subtree had failures keeps its name, so a
//! rerun finds the leftovers where they were.
//!
//! ## One Filesystem Trait
//!
//! The walker and file handler only see [`fs::Filesystem`]. Production code
//! uses [`fs::StdFs`]; tests use a recording wrapper that lists every
//! mutation in order and injects failures at chosen paths.
//!
//! ## Output Mode Never Mutates the Source
//!
//! With an output root, files are copied and no directory is renamed. An
//! output root inside the input tree is recognised and skipped.
//!
//! ## Known Lossy Case
//!
//! The file rule decodes `_`, the sentinel, and an encoded space all to a
//! space, so a name that already contained `_` does not survive a round
//! trip. See [`codec`].

pub mod codec;
pub mod config;
pub mod fs;
pub mod handler;
pub mod output;
pub mod paths;
pub mod report;
pub mod session;
pub mod walk;

pub use codec::{Direction, NameKind, transform};
pub use report::{EntryError, Tally, WalkEvent};
pub use session::{Mode, RunConfig, Session, SessionError};
pub use walk::walk;

#[cfg(test)]
pub(crate) mod test_helpers;
