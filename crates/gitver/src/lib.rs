//! Library interface for the `gitver` CLI.
//!
//! Exposes the argument parser so `xtask` can generate man pages and shell
//! completions, and so the commands can be tested. The entry point is in
//! `main.rs`.

pub mod commands;

use clap::{CommandFactory, Parser};
use gitver_core::{BumpOp, LogLevel, ProjectKind};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output. Call once at startup.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG          Log filter (e.g., debug, gitver_core=trace)
    GITVER_LOG_PATH   Also write JSONL logs to this file
    GITVER_LOG_DIR    Also write JSONL logs to gitver.jsonl in this directory
";

/// Bump the version declared in a project file and commit the change.
#[derive(Parser, Debug)]
#[command(name = "gitver")]
#[command(about = "Bump a project's version and commit it", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// Which part of the version to bump
    #[arg(value_enum, ignore_case = true, value_name = "PART")]
    pub part: BumpOp,

    /// Project type (detected from the files in DIR when omitted)
    #[arg(short, long, value_enum, value_name = "KIND")]
    pub project: Option<ProjectKind>,

    /// Project directory and git repository (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<String>,

    /// How many directory levels below DIR to search for the version file
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Commit message
    #[arg(
        short,
        long,
        value_name = "MSG",
        required_unless_present_any = ["no_commit", "dry_run"]
    )]
    pub message: Option<String>,

    /// Commit without bumping the version
    #[arg(long, conflicts_with = "no_commit")]
    pub no_bump: bool,

    /// Bump the version without committing
    #[arg(long)]
    pub no_commit: bool,

    /// Commit pending work with MSG first, then commit the bump on its own
    #[arg(long, conflicts_with_all = ["no_bump", "no_commit"])]
    pub separate_commits: bool,

    /// Show what would change without writing or committing
    #[arg(long)]
    pub dry_run: bool,

    /// Commit on a protected branch without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Log level
    #[arg(short, long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Whether the version file is rewritten.
    pub const fn bumps(&self) -> bool {
        !self.no_bump
    }

    /// Whether anything is committed.
    pub const fn commits(&self) -> bool {
        !self.no_commit && !self.dry_run
    }
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
