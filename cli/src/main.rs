//! bro - scaffold all the things
//!
//! Stage files from a working directory, commit them into a named template,
//! and clone templates into new projects. File collection and copying run on
//! bro-engine's bounded walker and copier pool.

mod commands;
mod project;

use bro_engine::{Options, ScanErrorPolicy};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::Context;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// bro - scaffold all the things
///
/// Track a project against a template, stage files with `add`, and
/// `commit` them into the template. `clone` copies a template into a new
/// directory.
#[derive(Parser, Debug)]
#[command(name = "bro", version, about, long_about = None)]
struct Args {
    /// Number of threads for tree walking and copying
    #[arg(
        short = 't',
        long,
        global = true,
        env = "BRO_THREADS",
        default_value = "16"
    )]
    threads: usize,

    /// What to do when a directory cannot be read while collecting files
    #[arg(long, global = true, value_enum, default_value = "warn")]
    scan_errors: ScanErrors,

    /// Directory holding the templates (default: ~/.bros)
    #[arg(long, global = true, env = "BRO_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// Disable progress bar
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Verbose logging (repeat for more)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mark the current directory as a bro project
    Init,
    /// Create a new template and track it from the current directory
    Create {
        /// Template name
        name: String,
    },
    /// Stage files and directories for the next commit
    Add {
        /// Files or directories inside the project
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove all files from staging
    Reset,
    /// Copy staged files into the tracked template
    Commit,
    /// Show the tracked template and the staged files
    Status,
    /// Track the current project against an existing template
    Track {
        /// Template name
        name: String,
    },
    /// Copy a template into a new directory
    Clone {
        /// Template name
        name: String,
        /// Destination directory (default: the template name)
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScanErrors {
    /// Skip unreadable directories silently
    Skip,
    /// Skip unreadable directories with a warning
    Warn,
    /// Fail the command if any directory could not be read
    Fail,
}

impl From<ScanErrors> for ScanErrorPolicy {
    fn from(s: ScanErrors) -> Self {
        match s {
            ScanErrors::Skip => ScanErrorPolicy::Skip,
            ScanErrors::Warn => ScanErrorPolicy::Warn,
            ScanErrors::Fail => ScanErrorPolicy::Fail,
        }
    }
}

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("not a bro project (or any of the parent directories): {path}")]
    NotAProject { path: PathBuf },

    #[error("project {name:?} does not exist")]
    TemplateNotFound { name: String },

    #[error("project with the name {name:?} already exists")]
    TemplateExists { name: String },

    #[error("invalid template name: {name:?}")]
    InvalidTemplateName { name: String },

    #[error("cannot commit: project not tracked (use \"bro track <template>\")")]
    NotTracked,

    #[error("cannot clone {name:?} into {dest}: destination overlaps the template")]
    CloneIntoTemplate { name: String, dest: PathBuf },

    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("path is outside the project root {root}: {path}")]
    OutsideProject { path: PathBuf, root: PathBuf },

    #[error("cannot locate the home directory; set BRO_HOME or pass --home")]
    NoHome,

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to parse project config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize project config: {source}")]
    JsonSerialize { source: serde_json::Error },

    #[error("failed to collect files under {path}: {source}")]
    Walk {
        path: PathBuf,
        source: bro_engine::Error,
    },

    #[error("copy failed: {source}")]
    Copy { source: bro_engine::Error },

    #[error("{failed} of {total} files could not be copied to {dest}")]
    PartialCopy {
        failed: usize,
        total: usize,
        dest: PathBuf,
    },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::NotAProject { .. }
            | Self::TemplateNotFound { .. }
            | Self::TemplateExists { .. }
            | Self::InvalidTemplateName { .. }
            | Self::NotTracked
            | Self::CloneIntoTemplate { .. }
            | Self::PathNotFound { .. }
            | Self::OutsideProject { .. } => 2,
            _ => 1,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(error) = run(args) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run(args: Args) -> CliResult<()> {
    let cwd = std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .map_err(|source| CliError::Io {
            action: "resolve",
            path: PathBuf::from("."),
            source,
        })?;

    let options = Options::default()
        .with_parallel(args.threads)
        .with_on_scan_error(args.scan_errors.into())
        .with_warn_handler(|msg| {
            eprintln!("warning: {}", msg);
        });

    let ctx = Context {
        options,
        quiet: args.quiet,
        cwd,
        home: args.home,
    };
    tracing::debug!(threads = ctx.options.parallel, cwd = %ctx.cwd.display(), "starting");

    match &args.command {
        Command::Init => commands::init(&ctx),
        Command::Create { name } => commands::create(&ctx, name),
        Command::Add { paths } => commands::add(&ctx, paths),
        Command::Reset => commands::reset(&ctx),
        Command::Commit => commands::commit(&ctx),
        Command::Status => commands::status(&ctx),
        Command::Track { name } => commands::track(&ctx, name),
        Command::Clone { name, dir } => commands::clone(&ctx, name, dir.as_deref()),
    }
}
