//! CLI output formatting.
//!
//! The user-facing contract is plain lines, independent of log verbosity:
//! one stdout line per rename or copy, one stderr line per failure.
//!
//! # Output Format
//!
//! ```text
//! Default output directory 'output' created
//! Renamed: proj/My Docs/a b.txt -> proj/@home@me@proj@My_Docs@a_b.txt
//! Renamed directory: proj/My Docs -> proj/My§Docs
//! Copied: proj/a b.txt -> output/@home@me@proj@a_b.txt
//! ```
//!
//! Failures, on stderr:
//!
//! ```text
//! error: rename proj/locked.txt: Permission denied (os error 13)
//! error: proj/deep/...: path too long: 4120 bytes exceeds the 4095-byte limit
//! ```
//!
//! No-op and skip events print nothing; they show up in the `--verbose` log.
//!
//! Each line has a pure `format_*` function so tests can check exact text,
//! and a `print_*` wrapper that writes it.

use crate::codec::NameKind;
use crate::report::{Tally, WalkEvent};
use std::path::Path;

/// Where a formatted line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Format one walk event, or `None` for events that print nothing.
pub fn format_event(event: &WalkEvent) -> Option<(Stream, String)> {
    match event {
        WalkEvent::Renamed {
            kind: NameKind::File,
            from,
            to,
        } => Some((
            Stream::Stdout,
            format!("Renamed: {} -> {}", from.display(), to.display()),
        )),
        WalkEvent::Renamed {
            kind: NameKind::Directory,
            from,
            to,
        } => Some((
            Stream::Stdout,
            format!("Renamed directory: {} -> {}", from.display(), to.display()),
        )),
        WalkEvent::Copied { from, to } => Some((
            Stream::Stdout,
            format!("Copied: {} -> {}", from.display(), to.display()),
        )),
        WalkEvent::Failed(err) => Some((Stream::Stderr, format_error(err))),
        WalkEvent::Unchanged { .. } | WalkEvent::Skipped { .. } => None,
    }
}

/// Print one walk event to the stream it belongs on.
pub fn print_event(event: &WalkEvent) {
    match format_event(event) {
        Some((Stream::Stdout, line)) => println!("{}", line),
        Some((Stream::Stderr, line)) => eprintln!("{}", line),
        None => {}
    }
}

/// `error: <message>` for any error.
pub fn format_error(err: &dyn std::error::Error) -> String {
    format!("error: {}", err)
}

pub fn print_error(err: &dyn std::error::Error) {
    eprintln!("{}", format_error(err));
}

/// Notice printed when the default output directory had to be created.
pub fn format_output_created(path: &Path) -> String {
    format!("Default output directory '{}' created", path.display())
}

pub fn print_output_created(path: &Path) {
    println!("{}", format_output_created(path));
}

/// Closing line after a run with failures. The CLI only prints it with `-v`.
pub fn format_summary(tally: &Tally) -> Option<String> {
    if tally.is_clean() {
        return None;
    }
    let first = tally
        .first_failure
        .as_deref()
        .map(|p| format!(" (first: {})", p.display()))
        .unwrap_or_default();
    Some(format!(
        "{} of {} entries failed{}",
        tally.failed,
        tally.renamed + tally.copied + tally.unchanged + tally.skipped + tally.failed,
        first
    ))
}
