//! Version bump planning and execution.
//!
//! # Two-phase workflow
//!
//! 1. **Plan** ([`plan_bump`]): find the declaration file, scan it for the
//!    current version, and compute the next one. Nothing is written.
//! 2. **Execute** ([`ReadyBump::execute`]): rewrite the declaration line.
//!
//! A dry run stops after the first phase and displays the [`ReadyBump`].

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::project::Declaration;
use crate::rewrite::{self, RewriteError};
use crate::scan::{self, ConfigLocation, ScanError};
use crate::search;
use crate::version::{BumpOp, Version};

/// Errors from bump operations.
#[derive(Error, Debug)]
pub enum BumpError {
    /// No declaration file exists under the search root.
    #[error("no {file_name} found under {root}")]
    DeclarationNotFound {
        /// File name that was searched for.
        file_name: &'static str,
        /// Directory the search started from.
        root: Utf8PathBuf,
    },

    /// Scanning the declaration file failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Writing the new version failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

/// A bump that has been computed but not yet written.
#[derive(Debug, Clone)]
pub struct ReadyBump {
    /// The requested operation.
    pub op: BumpOp,
    /// Where the current version lives, and what it is.
    pub location: ConfigLocation,
    /// The version that will be written.
    pub next: Version,
    /// How to render the new declaration line.
    pub declaration: Declaration,
}

/// Result of a successful bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpOutcome {
    /// The operation that was applied.
    pub op: BumpOp,
    /// The version before the bump.
    pub previous: Version,
    /// The version now on disk.
    pub new: Version,
    /// The rewritten file.
    pub file: Utf8PathBuf,
    /// Zero-based line that was replaced.
    pub line: usize,
}

/// Find the declaration under `root`, read its version and compute the next.
///
/// `max_depth` bounds the declaration search (see
/// [`search::find_file_by_name`]).
#[instrument(skip(declaration), fields(%root, file = declaration.file_name))]
pub fn plan_bump(
    op: BumpOp,
    root: &Utf8Path,
    declaration: Declaration,
    max_depth: Option<usize>,
) -> BumpResult<ReadyBump> {
    let file = search::find_file_by_name(declaration.file_name, root, max_depth).ok_or_else(
        || BumpError::DeclarationNotFound {
            file_name: declaration.file_name,
            root: root.to_path_buf(),
        },
    )?;

    let location = scan::scan_file(&file, declaration.matcher)?;
    let next = location.version.apply(op);
    debug!(current = %location.version, %next, "planned bump");

    Ok(ReadyBump {
        op,
        location,
        next,
        declaration,
    })
}

impl ReadyBump {
    /// The version currently on disk.
    pub const fn previous(&self) -> Version {
        self.location.version
    }

    /// Write the new version into the declaration file.
    #[instrument(skip(self), fields(file = %self.location.path, next = %self.next))]
    pub fn execute(&self) -> BumpResult<BumpOutcome> {
        rewrite::rewrite_line(
            &self.location.path,
            self.location.line,
            self.declaration.formatter,
            &self.next.to_string(),
        )?;

        info!(
            previous = %self.location.version,
            new = %self.next,
            file = %self.location.path,
            "version bumped"
        );

        Ok(self.preview())
    }

    /// The outcome [`execute`](Self::execute) would report, without writing.
    pub fn preview(&self) -> BumpOutcome {
        BumpOutcome {
            op: self.op,
            previous: self.location.version,
            new: self.next,
            file: self.location.path.clone(),
            line: self.location.line,
        }
    }
}

/// Plan and execute in one step.
pub fn bump(
    op: BumpOp,
    root: &Utf8Path,
    declaration: Declaration,
    max_depth: Option<usize>,
) -> BumpResult<BumpOutcome> {
    plan_bump(op, root, declaration, max_depth)?.execute()
}
