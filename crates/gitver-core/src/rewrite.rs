//! Replace a single line of a file, atomically.
//!
//! The new content goes to a temporary file next to the target, which is then
//! renamed over it. A failure at any point leaves the original file as it was.

use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::project::LineFormatter;

/// Errors from rewriting a file.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Reading, writing, or replacing the file failed.
    #[error("failed to rewrite {path}: {source}")]
    Io {
        /// Target file.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file has fewer lines than the requested index.
    #[error("{path} has {lines} lines, cannot replace line {line}")]
    LineOutOfRange {
        /// Target file.
        path: Utf8PathBuf,
        /// Zero-based line that was requested.
        line: usize,
        /// Number of lines in the file.
        lines: usize,
    },

    /// The line to replace is not valid UTF-8.
    #[error("{path}:{line}: declaration line is not valid UTF-8")]
    InvalidUtf8 {
        /// Target file.
        path: Utf8PathBuf,
        /// One-based line number, for humans.
        line: usize,
    },
}

/// Result alias for rewrite operations.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Replace line `line` (zero-based) of `path` with
/// `formatter(current_line, new_version)`.
///
/// Every other line is copied byte for byte, whatever its encoding; the
/// replaced line keeps its original terminator.
#[instrument(skip(formatter), fields(%path))]
pub fn rewrite_line(
    path: &Utf8Path,
    line: usize,
    formatter: LineFormatter,
    new_version: &str,
) -> RewriteResult<()> {
    let io_err = |source| RewriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let original = fs::read(path).map_err(io_err)?;
    let segments: Vec<&[u8]> = original.split_inclusive(|b| *b == b'\n').collect();
    let Some(target) = segments.get(line) else {
        return Err(RewriteError::LineOutOfRange {
            path: path.to_path_buf(),
            line,
            lines: segments.len(),
        });
    };

    let ending = terminator(target);
    let current = std::str::from_utf8(&target[..target.len() - ending.len()]).map_err(
        |_| RewriteError::InvalidUtf8 {
            path: path.to_path_buf(),
            line: line + 1,
        },
    )?;
    let replacement = formatter(current, new_version);

    let mut updated = Vec::with_capacity(original.len() + replacement.len());
    for (i, segment) in segments.iter().enumerate() {
        if i == line {
            updated.extend_from_slice(replacement.as_bytes());
            updated.extend_from_slice(ending);
        } else {
            updated.extend_from_slice(segment);
        }
    }

    let dir = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let permissions = fs::metadata(path).map_err(io_err)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&updated).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    fs::set_permissions(tmp.path(), permissions).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(line, %replacement, "rewrote declaration line");
    Ok(())
}

fn terminator(segment: &[u8]) -> &'static [u8] {
    if segment.ends_with(b"\r\n") {
        b"\r\n"
    } else if segment.ends_with(b"\n") {
        b"\n"
    } else {
        b""
    }
}
