//! Length-checked path bytes.
//!
//! Every path the codec produces and every path the walker joins is held in a
//! [`PathBytes`], which refuses to grow past [`MAX_PATH_BYTES`]. Operations that
//! would exceed the limit return [`PathTooLong`] instead of truncating.
//!
//! ## Platform bytes
//!
//! On Unix a path is an arbitrary byte string, so names carrying the codec's
//! sentinel byte (`0xA7`, not valid UTF-8 on its own) round-trip exactly through
//! [`os_bytes`] and [`path_from_bytes`]. Other targets go through UTF-8 and
//! replace anything unrepresentable with U+FFFD.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Platform path ceiling, terminator included.
pub const PATH_MAX: usize = 4096;

/// Longest path, in bytes, a [`PathBytes`] may hold.
pub const MAX_PATH_BYTES: usize = PATH_MAX - 1;

/// Canonical separator of the target platform.
#[cfg(windows)]
pub const SEPARATOR: u8 = b'\\';
/// Canonical separator of the target platform.
#[cfg(not(windows))]
pub const SEPARATOR: u8 = b'/';

/// `/` on every target, plus `\` on Windows.
pub fn is_separator(byte: u8) -> bool {
    byte == b'/' || (cfg!(windows) && byte == b'\\')
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("path too long: {len} bytes exceeds the {max}-byte limit")]
pub struct PathTooLong {
    pub len: usize,
    pub max: usize,
}

fn check_len(len: usize) -> Result<(), PathTooLong> {
    if len > MAX_PATH_BYTES {
        return Err(PathTooLong {
            len,
            max: MAX_PATH_BYTES,
        });
    }
    Ok(())
}

/// A path as raw bytes, never longer than [`MAX_PATH_BYTES`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PathBytes(Vec<u8>);

impl PathBytes {
    pub fn new(bytes: Vec<u8>) -> Result<Self, PathTooLong> {
        check_len(bytes.len())?;
        Ok(Self(bytes))
    }

    pub fn from_path(path: &Path) -> Result<Self, PathTooLong> {
        Self::new(os_bytes(path.as_os_str()).into_owned())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_path_buf(&self) -> PathBuf {
        path_from_bytes(&self.0)
    }

    /// Append `name` after a single separator.
    ///
    /// No separator is inserted when `self` is empty or already ends in one.
    pub fn join(&self, name: &[u8]) -> Result<Self, PathTooLong> {
        let needs_separator = self.0.last().is_some_and(|&b| !is_separator(b));
        let len = self.0.len() + usize::from(needs_separator) + name.len();
        check_len(len)?;

        let mut joined = Vec::with_capacity(len);
        joined.extend_from_slice(&self.0);
        if needs_separator {
            joined.push(SEPARATOR);
        }
        joined.extend_from_slice(name);
        Ok(Self(joined))
    }
}

impl fmt::Debug for PathBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathBytes({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for PathBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Join a directory and one entry name, capacity-checked.
pub fn join(dir: &Path, name: &OsStr) -> Result<PathBuf, PathTooLong> {
    Ok(PathBytes::from_path(dir)?
        .join(&os_bytes(name))?
        .to_path_buf())
}

#[cfg(unix)]
pub fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(s.as_bytes())
}

#[cfg(not(unix))]
pub fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    match s.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
pub fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
