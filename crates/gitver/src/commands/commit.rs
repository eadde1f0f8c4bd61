//! Commit step: thin CLI layer over `gitver_core::commit`.

use anyhow::Context;
use camino::Utf8Path;
use inquire::{Confirm, InquireError};
use owo_colors::OwoColorize;
use tracing::{debug, instrument, warn};

use gitver_core::commit::{self, CommitError, CommitPlan};
use gitver_core::config::CommitConfig;
use gitver_core::git::CommitSummary;

/// A commit that has passed the identity and branch checks.
#[derive(Debug)]
pub struct ReadyCommit {
    plan: CommitPlan,
    confirmed: bool,
}

/// Resolve the repository at `root` and settle the protected-branch question.
///
/// Fails with [`CommitError::UserAbort`] if the user declines, or if a
/// confirmation is needed and there is no terminal to ask on.
#[instrument(skip(config))]
pub fn prepare(root: &Utf8Path, config: &CommitConfig, yes: bool) -> anyhow::Result<ReadyCommit> {
    let plan = commit::prepare_commit(Some(root), config).context("failed to prepare commit")?;

    let confirmed = if plan.needs_confirmation(config) && !yes {
        confirm_protected(&plan)?
    } else {
        true
    };
    debug!(protected = plan.protected, confirmed, "commit prepared");

    if plan.protected && !confirmed {
        let branch = plan.branch.clone().unwrap_or_default();
        return Err(CommitError::UserAbort(branch).into());
    }

    Ok(ReadyCommit { plan, confirmed })
}

impl ReadyCommit {
    /// Stage everything and commit with `message`.
    pub fn commit(&self, message: &str, json: bool) -> anyhow::Result<CommitSummary> {
        let summary = self.plan.execute(message, self.confirmed)?;
        if !json {
            println!(
                "  {} Committed {} {}",
                "✓".green(),
                summary.hash.yellow(),
                summary.summary
            );
        }
        Ok(summary)
    }
}

fn confirm_protected(plan: &CommitPlan) -> anyhow::Result<bool> {
    let branch = plan.branch.as_deref().unwrap_or_default();
    if !super::is_interactive() {
        warn!(%branch, "no terminal to confirm a commit on a protected branch (use --yes)");
        return Ok(false);
    }

    let answer = Confirm::new(&format!(
        "You are on protected branch `{branch}`. Commit anyway?"
    ))
    .with_default(false)
    .prompt();

    match answer {
        Ok(yes) => Ok(yes),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(e).context("confirmation prompt failed"),
    }
}
