//! Commit planning: identity, branch guard, staging.
//!
//! [`prepare_commit`] gathers everything the commit needs and fails early,
//! before anything is staged, when no identity is configured. The caller
//! decides whether a protected branch has been confirmed (prompt, `--yes`,
//! or config) and passes that to [`CommitPlan::execute`].

use camino::Utf8Path;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::CommitConfig;
use crate::git::{self, Author, CommitSummary, GitError, Repository};

/// Errors from the commit step.
#[derive(Error, Debug)]
pub enum CommitError {
    /// `user.name` or `user.email` is not configured.
    #[error("git identity incomplete: `{0}` is not set (try `git config --global {0} ...`)")]
    MissingIdentity(&'static str),

    /// The user declined to commit on a protected branch.
    #[error("refusing to commit on protected branch `{0}`")]
    UserAbort(String),

    /// The working tree has no changes.
    #[error("nothing to commit in {0}")]
    NothingToCommit(camino::Utf8PathBuf),

    /// A git command failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Result alias for commit operations.
pub type CommitResult<T> = Result<T, CommitError>;

/// Everything needed to make a commit, gathered up front.
#[derive(Debug, Clone, Serialize)]
pub struct CommitPlan {
    /// Target repository.
    pub repo: Repository,
    /// Checked-out branch (`None` when detached).
    pub branch: Option<String>,
    /// Identity to record.
    pub author: Author,
    /// Whether `branch` is in the protected list.
    pub protected: bool,
}

/// Resolve the repository at `path` and collect identity and branch state.
#[instrument(skip(config))]
pub fn prepare_commit(path: Option<&Utf8Path>, config: &CommitConfig) -> CommitResult<CommitPlan> {
    let repo = git::resolve_repository(path)?;
    let author = author(&repo)?;
    let branch = git::current_branch(&repo)?;
    let protected = branch.as_deref().is_some_and(|b| config.is_protected(b));
    debug!(?branch, protected, "prepared commit");

    Ok(CommitPlan {
        repo,
        branch,
        author,
        protected,
    })
}

/// The commit identity from git configuration.
pub fn author(repo: &Repository) -> CommitResult<Author> {
    let name = git::config_value(repo, "user.name")?
        .ok_or(CommitError::MissingIdentity("user.name"))?;
    let email = git::config_value(repo, "user.email")?
        .ok_or(CommitError::MissingIdentity("user.email"))?;
    Ok(Author { name, email })
}

impl CommitPlan {
    /// Whether the user must confirm before [`execute`](Self::execute).
    pub const fn needs_confirmation(&self, config: &CommitConfig) -> bool {
        self.protected && config.confirm_protected
    }

    /// Stage everything and commit it with `message`.
    ///
    /// `confirmed` must be true to commit on a protected branch. Changes
    /// already in the index are committed even when nothing is left to stage.
    #[instrument(skip(self), fields(root = %self.repo.root, branch = ?self.branch))]
    pub fn execute(&self, message: &str, confirmed: bool) -> CommitResult<CommitSummary> {
        if self.protected && !confirmed {
            let branch = self.branch.clone().unwrap_or_default();
            warn!(%branch, "commit on protected branch not confirmed");
            return Err(CommitError::UserAbort(branch));
        }

        let paths = git::unstaged_and_untracked_paths(&self.repo)?;
        if paths.is_empty() {
            debug!("nothing to stage");
        } else {
            debug!(?paths, "staging");
            git::stage_all(&self.repo)?;
        }

        if !git::has_pending_changes(&self.repo)? {
            return Err(CommitError::NothingToCommit(self.repo.root.clone()));
        }

        Ok(git::commit(&self.repo, message, &self.author)?)
    }
}

/// Fill `{version}` in a commit message template.
pub fn render_bump_message(template: &str, version: &str) -> String {
    template.replace("{version}", version)
}
