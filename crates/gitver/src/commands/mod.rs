//! Command implementations

pub mod bump;

pub mod commit;

use std::io::IsTerminal;

use anyhow::Context;
use camino::Utf8Path;
use gitver_core::bump::BumpOutcome;
use gitver_core::commit::{self as core_commit, CommitError};
use gitver_core::config::Config;
use gitver_core::git::CommitSummary;
use gitver_core::{ProjectKind, detect};
use inquire::Select;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::Cli;

/// Everything a run did, printed as one document with `--json`.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Nothing was written or committed.
    pub dry_run: bool,
    /// The bump that was applied (or would be, on a dry run).
    pub bump: Option<BumpOutcome>,
    /// Commits made, oldest first.
    pub commits: Vec<CommitSummary>,
}

/// Whether prompts can be shown.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Bump and/or commit as the flags ask.
///
/// The commit is prepared (identity, branch guard, confirmation) and the bump
/// planned (declaration found, version parsed) before anything is committed
/// or written, so either failing leaves the tree and history as they were.
#[instrument(name = "run", skip_all, fields(part = %cli.part, root = %root))]
pub fn run(cli: &Cli, config: &Config, root: &Utf8Path) -> anyhow::Result<RunReport> {
    let mut report = RunReport {
        dry_run: cli.dry_run,
        ..RunReport::default()
    };

    let commit = if cli.commits() {
        Some(commit::prepare(root, &config.commit, cli.yes)?)
    } else {
        None
    };

    let planned = if cli.bumps() {
        let kind = resolve_kind(cli, config, root)?;
        let max_depth = cli.max_depth.or_else(|| config.search_depth());
        Some(bump::plan(cli.part, kind, root, max_depth, cli.json)?)
    } else {
        None
    };

    if let Some(ref ready) = commit
        && cli.separate_commits
    {
        let message = cli.message.as_deref().unwrap_or_default();
        match ready.commit(message, cli.json) {
            Ok(summary) => report.commits.push(summary),
            Err(err) => match err.downcast_ref::<CommitError>() {
                Some(CommitError::NothingToCommit(_)) => {
                    warn!("no pending changes, skipping the first commit");
                }
                _ => return Err(err),
            },
        }
    }

    if let Some(ref ready) = planned {
        report.bump = Some(bump::apply(ready, cli.dry_run, cli.json)?);
    }

    if let Some(ref ready) = commit {
        let message = match (&report.bump, cli.separate_commits) {
            (Some(outcome), true) => core_commit::render_bump_message(
                &config.commit.bump_message,
                &outcome.new.to_string(),
            ),
            _ => cli.message.clone().unwrap_or_default(),
        };
        report.commits.push(ready.commit(&message, cli.json)?);
    }

    if cli.dry_run && !cli.json {
        println!();
        println!("{}", "Dry run: no changes made.".yellow());
    }

    debug!(commits = report.commits.len(), "run complete");
    Ok(report)
}

/// Explicit flag, then config, then detection, then (on a terminal) a prompt.
fn resolve_kind(cli: &Cli, config: &Config, root: &Utf8Path) -> anyhow::Result<ProjectKind> {
    if let Some(kind) = detect::resolve_project_kind(cli.project, config, root) {
        return Ok(kind);
    }
    if cli.json || !is_interactive() {
        anyhow::bail!(
            "could not detect project type in {root}; pass --project or set `project.type` in config"
        );
    }
    prompt_project_kind(root)
}

/// Ask which kind of project this is when nothing was detected.
pub fn prompt_project_kind(root: &Utf8Path) -> anyhow::Result<ProjectKind> {
    println!(
        "\n{}",
        "Could not auto-detect project type.".yellow().bold()
    );
    let markers: Vec<&str> = ProjectKind::ALL.iter().map(|k| k.file_name()).collect();
    println!(
        "{}",
        format!("No {} found in {root}.", markers.join(", ")).dimmed()
    );
    println!();

    let options: Vec<String> = ProjectKind::ALL
        .iter()
        .map(|k| format!("{k} ({})", k.file_name()))
        .collect();
    let selection = Select::new("Select project type:", options)
        .with_starting_cursor(0)
        .raw_prompt()
        .context("project type selection cancelled")?;

    ProjectKind::ALL
        .get(selection.index)
        .copied()
        .context("unexpected selection")
}
