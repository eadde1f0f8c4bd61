//! Git operations for the commit step.
//!
//! Shells out to `git` for everything, so the user's hooks, signing setup
//! and configuration all apply. Every call runs with `-C <repo root>`.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository: {0}")]
    NotARepo(Utf8PathBuf),
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// A working tree, identified by its top-level directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// Absolute path of the working tree root.
    pub root: Utf8PathBuf,
}

/// Identity recorded on commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// `user.name`
    pub name: String,
    /// `user.email`
    pub email: String,
}

/// A commit that was just created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Abbreviated commit hash.
    pub hash: String,
    /// First line of the commit message.
    pub summary: String,
}

/// Open the repository containing `path` (or the current directory).
#[instrument]
pub fn resolve_repository(path: Option<&Utf8Path>) -> GitResult<Repository> {
    let dir = path.unwrap_or_else(|| Utf8Path::new("."));
    let output = match git_in(dir, &["rev-parse", "--show-toplevel"]) {
        Ok(output) => output,
        Err(GitError::Command { .. }) => return Err(GitError::NotARepo(dir.to_path_buf())),
        Err(e) => return Err(e),
    };
    let root = Utf8PathBuf::from(output.trim());
    debug!(%root, "resolved repository");
    Ok(Repository { root })
}

/// Paths with unstaged modifications plus untracked files.
#[instrument(skip(repo), fields(root = %repo.root))]
pub fn unstaged_and_untracked_paths(repo: &Repository) -> GitResult<Vec<String>> {
    let paths: Vec<String> = status_entries(repo)?
        .into_iter()
        .filter(|entry| entry.untracked() || entry.worktree != ' ')
        .map(|entry| entry.path)
        .collect();
    debug!(count = paths.len(), "unstaged and untracked paths");
    Ok(paths)
}

/// Whether the working tree or index differs from `HEAD` in any way.
#[instrument(skip(repo), fields(root = %repo.root))]
pub fn has_pending_changes(repo: &Repository) -> GitResult<bool> {
    let pending = !status_entries(repo)?.is_empty();
    debug!(pending, "pending changes");
    Ok(pending)
}

/// Stage every change, including untracked and deleted files.
#[instrument(skip(repo), fields(root = %repo.root))]
pub fn stage_all(repo: &Repository) -> GitResult<()> {
    git_in(&repo.root, &["add", "--all"])?;
    Ok(())
}

/// The checked-out branch, or `None` on a detached `HEAD`.
///
/// Works on a freshly initialized repository with no commits yet.
#[instrument(skip(repo), fields(root = %repo.root))]
pub fn current_branch(repo: &Repository) -> GitResult<Option<String>> {
    match git_in(&repo.root, &["symbolic-ref", "--short", "-q", "HEAD"]) {
        Ok(output) => {
            let branch = output.trim().to_string();
            debug!(%branch, "current branch");
            Ok(Some(branch))
        }
        Err(GitError::Command { .. }) => {
            debug!("detached HEAD");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read a configuration value as git resolves it for this repository.
///
/// Returns `None` when the key is unset or blank.
pub fn config_value(repo: &Repository, key: &str) -> GitResult<Option<String>> {
    match git_in(&repo.root, &["config", "--get", key]) {
        Ok(output) => {
            let value = output.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        // exit code 1: key not set
        Err(GitError::Command { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Commit what is staged, recording `author` as author and committer.
#[instrument(skip(repo, author), fields(root = %repo.root, author = %author.name))]
pub fn commit(repo: &Repository, message: &str, author: &Author) -> GitResult<CommitSummary> {
    let name = format!("user.name={}", author.name);
    let email = format!("user.email={}", author.email);
    git_in(
        &repo.root,
        &["-c", &name, "-c", &email, "commit", "--quiet", "-m", message],
    )?;

    let output = git_in(&repo.root, &["log", "-1", "--format=%h %s"])?;
    let line = output.trim();
    let (hash, summary) = line.split_once(' ').unwrap_or((line, ""));
    let summary = CommitSummary {
        hash: hash.to_string(),
        summary: summary.to_string(),
    };
    info!(hash = %summary.hash, summary = %summary.summary, "committed");
    Ok(summary)
}

/// One line of `git status --porcelain`.
#[derive(Debug, PartialEq, Eq)]
struct StatusEntry {
    index: char,
    worktree: char,
    path: String,
}

impl StatusEntry {
    fn parse(line: &str) -> Option<Self> {
        let mut chars = line.chars();
        let index = chars.next()?;
        let worktree = chars.next()?;
        let rest = line.get(3..)?;
        // renames read `ORIG -> PATH`
        let path = rest.rsplit(" -> ").next().unwrap_or(rest);
        Some(Self {
            index,
            worktree,
            path: path.trim_matches('"').to_string(),
        })
    }

    const fn untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }
}

fn status_entries(repo: &Repository) -> GitResult<Vec<StatusEntry>> {
    let output = git_in(&repo.root, &["status", "--porcelain"])?;
    Ok(output.lines().filter_map(StatusEntry::parse).collect())
}

/// Run `git -C <dir> <args>` and return its stdout.
fn git_in(dir: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir.as_str())
        .args(args)
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let command = args
            .iter()
            .find(|arg| !arg.starts_with('-') && !arg.contains('='))
            .unwrap_or(&"")
            .to_string();
        Err(GitError::Command { command, stderr })
    }
}
