//! Path resolution for user-supplied directories.
//!
//! Expands a leading `~`, anchors relative paths on the current directory,
//! and normalizes `.`/`..` lexically (no symlink resolution).

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from path resolution.
#[derive(Error, Debug)]
pub enum PathError {
    /// No path (or only whitespace) was given.
    #[error("empty path")]
    Empty,

    /// `~` was used but the home directory is unknown.
    #[error("cannot expand `~`: home directory not found")]
    NoHome,

    /// The current directory is unavailable or not UTF-8.
    #[error("cannot determine current directory")]
    NoCurrentDir,

    /// The resolved path is not an existing directory.
    #[error("not a directory: {0}")]
    NotADirectory(Utf8PathBuf),
}

/// Result alias for path operations.
pub type PathResult<T> = Result<T, PathError>;

/// Expand `~` and normalize `input` to an absolute path.
pub fn resolve_path(input: Option<&str>) -> PathResult<Utf8PathBuf> {
    let raw = input.map(str::trim).filter(|s| !s.is_empty()).ok_or(PathError::Empty)?;
    let expanded = expand_home(raw)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        current_dir()?.join(expanded)
    };
    let resolved = normalize(&absolute);
    debug!(input = raw, %resolved, "resolved path");
    Ok(resolved)
}

/// Like [`resolve_path`], but the result must be an existing directory.
pub fn resolve_dir(input: Option<&str>) -> PathResult<Utf8PathBuf> {
    let resolved = resolve_path(input)?;
    if resolved.is_dir() {
        Ok(resolved)
    } else {
        Err(PathError::NotADirectory(resolved))
    }
}

/// Absolute, normalized form of `path`, or `None` when the current
/// directory is unavailable.
pub fn absolutize(path: &Utf8Path) -> Option<Utf8PathBuf> {
    if path.is_absolute() {
        return Some(normalize(path));
    }
    current_dir().ok().map(|cwd| normalize(&cwd.join(path)))
}

fn expand_home(raw: &str) -> PathResult<Utf8PathBuf> {
    let rest = match raw.strip_prefix('~') {
        None => return Ok(Utf8PathBuf::from(raw)),
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        // `~user` forms are left alone
        Some(_) => return Ok(Utf8PathBuf::from(raw)),
    };
    let home = home_dir().ok_or(PathError::NoHome)?;
    Ok(home.join(rest.trim_start_matches(['/', '\\'])))
}

fn home_dir() -> Option<Utf8PathBuf> {
    let dirs = directories::BaseDirs::new()?;
    Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok()
}

fn current_dir() -> PathResult<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|_| PathError::NoCurrentDir)?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|_| PathError::NoCurrentDir)
}

fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_str()),
        }
    }
    out
}
