//! One invocation: validate the run configuration, prepare the output
//! directory, drive the top-level walk.
//!
//! Everything that can go wrong before the first rename or copy is a
//! [`SessionError`] and stops the run. Everything after that is a per-entry
//! failure inside the returned [`Tally`].

use crate::codec::Direction;
use crate::config::ConfigError;
use crate::fs::{EntryKind, Filesystem};
use crate::handler::FileContext;
use crate::report::{Tally, WalkEvent};
use crate::walk::Walker;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("output path {} exists and is not a directory", .0.display())]
    OutputNotDirectory(PathBuf),
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Encode or decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

impl From<Mode> for Direction {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Encode => Direction::Encode,
            Mode::Decode => Direction::Decode,
        }
    }
}

/// What one invocation does. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    mode: Mode,
    input_root: PathBuf,
    output_root: Option<PathBuf>,
}

impl RunConfig {
    /// Rejects an output root in decode mode: decoding always renames in
    /// place.
    pub fn new(
        mode: Mode,
        input_root: PathBuf,
        output_root: Option<PathBuf>,
    ) -> Result<Self, SessionError> {
        if mode == Mode::Decode && output_root.is_some() {
            return Err(SessionError::InvalidArguments(
                "--output cannot be used with --decode".into(),
            ));
        }
        Ok(Self {
            mode,
            input_root,
            output_root,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> Option<&Path> {
        self.output_root.as_deref()
    }
}

/// Whether [`ensure_output_directory`] had to create the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDirState {
    Created,
    Existing,
}

/// Make sure `path` is a directory, creating it (and its parents) if absent.
pub fn ensure_output_directory<F: Filesystem + ?Sized>(
    fs: &F,
    path: &Path,
    mode: u32,
) -> Result<OutputDirState, SessionError> {
    match fs.stat(path) {
        Ok(EntryKind::Directory) => Ok(OutputDirState::Existing),
        Ok(_) => Err(SessionError::OutputNotDirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs.make_dir_recursive(path, mode)
                .map_err(|source| SessionError::OutputCreate {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(OutputDirState::Created)
        }
        Err(source) => Err(SessionError::OutputCreate {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// A validated run, ready to walk.
pub struct Session<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    run: RunConfig,
    dir_mode: u32,
    /// Canonical output root, set by [`Session::prepare`].
    resolved_output: Option<PathBuf>,
}

impl<'a, F: Filesystem + ?Sized> Session<'a, F> {
    pub fn new(fs: &'a F, run: RunConfig, dir_mode: u32) -> Self {
        Self {
            fs,
            run,
            dir_mode,
            resolved_output: None,
        }
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Check the input root and create the output root.
    ///
    /// The input is checked first, so a bad input never leaves a freshly
    /// created output directory behind. An output root that resolves to the
    /// input root itself is rejected: the copies would land in the tree
    /// being walked.
    pub fn prepare(&mut self) -> Result<Option<OutputDirState>, SessionError> {
        let input = self.run.input_root();
        match self.fs.stat(input) {
            Ok(EntryKind::Directory) => {}
            Ok(_) => {
                return Err(SessionError::InvalidArguments(format!(
                    "{} is not a directory",
                    input.display()
                )));
            }
            Err(e) => {
                return Err(SessionError::InvalidArguments(format!(
                    "{}: {e}",
                    input.display()
                )));
            }
        }

        let Some(output) = self.run.output_root() else {
            return Ok(None);
        };
        let state = ensure_output_directory(self.fs, output, self.dir_mode)?;
        let resolved = self
            .fs
            .resolve_absolute(output)
            .map_err(|source| SessionError::OutputCreate {
                path: output.to_path_buf(),
                source,
            })?;
        let resolved_input = self.fs.resolve_absolute(input).map_err(|e| {
            SessionError::InvalidArguments(format!("{}: {e}", input.display()))
        })?;
        if resolved == resolved_input {
            return Err(SessionError::InvalidArguments(format!(
                "output directory {} is the input directory",
                output.display()
            )));
        }
        debug!(output = %resolved.display(), ?state, "output directory ready");
        self.resolved_output = Some(resolved);
        Ok(Some(state))
    }

    /// Walk the input root. The root itself is never renamed.
    pub fn execute(&self, observer: &mut dyn FnMut(&WalkEvent)) -> Tally {
        let input = self.run.input_root();
        let ctx = FileContext {
            anchor: input.to_path_buf(),
            output_root: self.resolved_output.clone(),
            dir_mode: self.dir_mode,
        };
        let tally = Walker::new(self.fs, self.run.mode().into(), ctx, observer).walk(input, true);
        info!(
            mode = ?self.run.mode(),
            input = %input.display(),
            %tally,
            "run finished"
        );
        tally
    }

    /// [`prepare`](Self::prepare) then [`execute`](Self::execute).
    pub fn run(
        mut self,
        observer: &mut dyn FnMut(&WalkEvent),
    ) -> Result<(Option<OutputDirState>, Tally), SessionError> {
        let state = self.prepare()?;
        Ok((state, self.execute(observer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFs;
    use crate::fs::backend::tests::RecordingFs;
    use crate::test_helpers::{build_tree, snapshot};
    use std::fs;

    #[test]
    fn decode_with_output_is_invalid() {
        let err = RunConfig::new(Mode::Decode, "in".into(), Some("out".into())).unwrap_err();
        assert!(matches!(err, SessionError::InvalidArguments(_)));
    }

    #[test]
    fn encode_with_output_is_valid() {
        let run = RunConfig::new(Mode::Encode, "in".into(), Some("out".into())).unwrap();
        assert_eq!(run.output_root(), Some(Path::new("out")));
        assert_eq!(run.mode(), Mode::Encode);
    }

    #[test]
    fn ensure_output_creates_missing_directory() {
        let tmp = build_tree(&[]);
        let out = tmp.path().join("a/b");
        let state = ensure_output_directory(&StdFs, &out, 0o755).unwrap();
        assert_eq!(state, OutputDirState::Created);
        assert!(out.is_dir());
        let again = ensure_output_directory(&StdFs, &out, 0o755).unwrap();
        assert_eq!(again, OutputDirState::Existing);
    }

    #[test]
    fn ensure_output_rejects_a_file() {
        let tmp = build_tree(&[("out", "not a dir")]);
        let err = ensure_output_directory(&StdFs, &tmp.path().join("out"), 0o755).unwrap_err();
        assert!(matches!(err, SessionError::OutputNotDirectory(_)));
    }

    #[test]
    fn missing_input_fails_before_output_is_created() {
        let tmp = build_tree(&[]);
        let out = tmp.path().join("out");
        let run =
            RunConfig::new(Mode::Encode, tmp.path().join("missing"), Some(out.clone())).unwrap();
        let fs_ = RecordingFs::new();

        let err = Session::new(&fs_, run, 0o755).run(&mut |_: &WalkEvent| {}).unwrap_err();

        assert!(matches!(err, SessionError::InvalidArguments(_)));
        assert!(fs_.mutations().is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn input_that_is_a_file_is_invalid() {
        let tmp = build_tree(&[("f", "")]);
        let run = RunConfig::new(Mode::Decode, tmp.path().join("f"), None).unwrap();
        let err = Session::new(&StdFs, run, 0o755).run(&mut |_: &WalkEvent| {}).unwrap_err();
        assert!(matches!(err, SessionError::InvalidArguments(_)));
    }

    #[test]
    fn encode_session_copies_into_output() {
        let tmp = build_tree(&[("in/a b.txt", "data")]);
        let input = tmp.path().join("in");
        let out = tmp.path().join("out");
        let before = snapshot(&input);
        let run = RunConfig::new(Mode::Encode, input.clone(), Some(out.clone())).unwrap();

        let mut copies = 0;
        let (state, tally) = Session::new(&StdFs, run, 0o755)
            .run(&mut |e: &WalkEvent| {
                if matches!(e, WalkEvent::Copied { .. }) {
                    copies += 1;
                }
            })
            .unwrap();

        assert_eq!(state, Some(OutputDirState::Created));
        assert_eq!(tally.copied, 1);
        assert_eq!(copies, 1);
        assert_eq!(snapshot(&input), before);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn output_equal_to_input_is_rejected_before_any_copy() {
        let tmp = build_tree(&[("in/a b.txt", "data")]);
        let input = tmp.path().join("in");
        let before = snapshot(&input);
        // Same directory, spelled differently
        let run = RunConfig::new(Mode::Encode, input.clone(), Some(input.join("."))).unwrap();
        let fs_ = RecordingFs::new();

        let err = Session::new(&fs_, run, 0o755).run(&mut |_: &WalkEvent| {}).unwrap_err();

        assert!(matches!(err, SessionError::InvalidArguments(_)));
        assert!(fs_.mutations().is_empty());
        assert_eq!(snapshot(&input), before);
    }

    #[test]
    fn decode_session_never_renames_the_root() {
        let tmp = build_tree(&[("root_dir/a_b", "")]);
        let input = tmp.path().join("root_dir");
        let run = RunConfig::new(Mode::Decode, input.clone(), None).unwrap();

        let (state, tally) = Session::new(&StdFs, run, 0o755).run(&mut |_: &WalkEvent| {}).unwrap();

        assert_eq!(state, None);
        assert_eq!(tally.renamed, 1);
        assert!(input.join("a b").is_file());
    }
}
