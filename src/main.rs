use clap::{ArgGroup, Parser};
use filinator::config::{self, ToolConfig};
use filinator::fs::StdFs;
use filinator::output;
use filinator::report::{Tally, WalkEvent};
use filinator::session::{Mode, OutputDirState, RunConfig, Session, SessionError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let describe = env!("FILINATOR_GIT_DESCRIBE");
    if describe.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({describe})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser, Debug)]
#[command(name = "filinator")]
#[command(about = "Reversibly encode spaces and separators in file and directory names")]
#[command(long_about = "\
Reversibly encode spaces and separators in file and directory names

Encoding flattens every file's absolute path into a single name that survives
tools which mangle spaces and slashes. Decoding turns those names back into
paths, recreating the directories they name.

  File names:       '/' -> '@'   ' ' -> '_'
  Directory names:  ' ' -> '\\xA7' (the section sign)

By default --encode copies into ./output and leaves the source untouched.
--in-place renames instead. --decode always renames in place.

The older single-dash spellings (-encode, -decode, -output) are accepted.

Run 'filinator --gen-config' to print a documented filinator.toml.")]
#[command(version = version_string())]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["encode", "decode", "gen_config"]),
))]
struct Cli {
    /// Encode names under DIR
    #[arg(long, value_name = "DIR")]
    encode: Option<PathBuf>,

    /// Decode names under DIR, in place
    #[arg(long, value_name = "DIR")]
    decode: Option<PathBuf>,

    /// Copy encoded files into DIR (default from config: "output")
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Rename in place instead of copying when encoding
    #[arg(long, conflicts_with = "output", requires = "encode")]
    in_place: bool,

    /// Config file (default: ./filinator.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a stock filinator.toml with all options documented
    #[arg(long)]
    gen_config: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less log output on stderr
    #[arg(short = 'q', long, action = clap::ArgAction::Count)]
    quiet: u8,
}

/// Long options the tool historically spelled with a single dash.
const LEGACY_LONG_OPTIONS: &[&str] = &[
    "encode",
    "decode",
    "output",
    "config",
    "gen-config",
    "in-place",
];

/// Rewrite `-encode` style options to `--encode` so clap sees long options.
fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if LEGACY_LONG_OPTIONS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

/// 0 verbose flags means WARN; each -v raises and each -q lowers one step.
fn level_for(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 5] = [
        LevelFilter::ERROR,
        LevelFilter::WARN,
        LevelFilter::INFO,
        LevelFilter::DEBUG,
        LevelFilter::TRACE,
    ];
    let index = (1 + i32::from(verbose) - i32::from(quiet)).clamp(0, 4);
    LEVELS[index as usize]
}

fn init_tracing(verbose: u8, quiet: u8) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_for(verbose, quiet).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Turn parsed flags and config into a run, remembering whether the output
/// directory came from the config default.
fn run_config(cli: &Cli, config: &ToolConfig) -> Result<(RunConfig, bool), SessionError> {
    match (&cli.encode, &cli.decode) {
        (Some(input), None) => {
            let (output, defaulted) = match &cli.output {
                Some(out) => (Some(out.clone()), false),
                None if cli.in_place || config.encode_in_place => (None, false),
                None => (Some(PathBuf::from(&config.default_output)), true),
            };
            Ok((RunConfig::new(Mode::Encode, input.clone(), output)?, defaulted))
        }
        (None, Some(input)) => Ok((
            RunConfig::new(Mode::Decode, input.clone(), cli.output.clone())?,
            false,
        )),
        _ => Err(SessionError::InvalidArguments(
            "exactly one of --encode or --decode is required".into(),
        )),
    }
}

/// The closing failure count is extra stderr output, so it waits for `-v`.
fn closing_summary(tally: &Tally, verbose: u8) -> Option<String> {
    if verbose == 0 {
        return None;
    }
    output::format_summary(tally)
}

fn run(cli: &Cli) -> Result<bool, SessionError> {
    let cwd = std::env::current_dir().map_err(|e| {
        SessionError::InvalidArguments(format!("cannot read working directory: {e}"))
    })?;
    let config = config::load_config(cli.config.as_deref(), &cwd)?;
    let (run, defaulted) = run_config(cli, &config)?;

    let mut session = Session::new(&StdFs, run, config.dir_mode);
    let state = session.prepare()?;
    if defaulted && state == Some(OutputDirState::Created) {
        let output = session
            .run_config()
            .output_root()
            .unwrap_or_else(|| Path::new(config::DEFAULT_OUTPUT));
        output::print_output_created(output);
    }

    let tally = session.execute(&mut |event: &WalkEvent| output::print_event(event));
    if let Some(line) = closing_summary(&tally, cli.verbose) {
        eprintln!("{line}");
    }
    Ok(tally.is_clean())
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_legacy_args(std::env::args_os()));
    init_tracing(cli.verbose, cli.quiet);

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
