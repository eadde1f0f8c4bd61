//! Project kind detection.
//!
//! A kind is detected when its declaration file sits directly in the search
//! root. Kinds are tried in [`ProjectKind::ALL`] order, so a repository with
//! both `Cargo.toml` and `setup.py` is treated as Rust.

use camino::Utf8Path;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::project::ProjectKind;

/// Identify the project kind from marker files in `root`.
///
/// Returns `None` if no declaration file is present.
#[instrument(fields(%root))]
pub fn detect_project_kind(root: &Utf8Path) -> Option<ProjectKind> {
    let kind = ProjectKind::ALL
        .iter()
        .copied()
        .find(|kind| root.join(kind.file_name()).is_file());
    debug!(?kind, "detected project kind");
    kind
}

/// Pick the project kind: explicit choice, then `project.type` from config,
/// then detection in `root`.
pub fn resolve_project_kind(
    explicit: Option<ProjectKind>,
    config: &Config,
    root: &Utf8Path,
) -> Option<ProjectKind> {
    explicit
        .or_else(|| config.project.as_ref().and_then(|p| p.project_type))
        .or_else(|| detect_project_kind(root))
}
