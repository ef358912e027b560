//! Filesystem access behind one capability trait.
//!
//! | Capability | Trait method |
//! |---|---|
//! | Directory iteration | [`Filesystem::open_dir`] (handle closes on drop) |
//! | Stat | [`Filesystem::stat`] |
//! | `mkdir -p` | [`Filesystem::make_dir_recursive`] |
//! | realpath | [`Filesystem::resolve_absolute`] |
//! | Rename | [`Filesystem::rename`] |
//! | Binary copy | [`Filesystem::copy_bytes`] |
//!
//! Path joining is pure and capacity-checked, so it lives in
//! [`crate::paths::join`] rather than on the trait.

pub mod backend;
pub mod std_backend;

pub use backend::{DirEntries, DirEntry, EntryKind, Filesystem};
pub use std_backend::StdFs;
