//! Bump step: thin CLI layer over `gitver_core::bump`.

use anyhow::Context;
use camino::Utf8Path;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use gitver_core::bump::{self, BumpOutcome, ReadyBump};
use gitver_core::{BumpOp, ProjectKind};

/// Find and read the declaration, compute the next version, and show it.
///
/// Nothing is written; see [`apply`].
#[instrument(name = "plan_bump", skip_all, fields(%op, %kind))]
pub fn plan(
    op: BumpOp,
    kind: ProjectKind,
    root: &Utf8Path,
    max_depth: Option<usize>,
    json: bool,
) -> anyhow::Result<ReadyBump> {
    debug!(?max_depth, "planning bump");

    let ready = bump::plan_bump(op, root, kind.declaration(), max_depth)
        .context("bump planning failed")?;

    if !json {
        println!(
            "{}: {} → {}",
            "Version".bold(),
            ready.previous().to_string().dimmed(),
            ready.next.to_string().green().bold()
        );
        println!(
            "{}: {} (line {})",
            "File".dimmed(),
            ready.location.path.as_str().cyan(),
            ready.location.line + 1
        );
    }
    Ok(ready)
}

/// Write a planned bump, unless this is a dry run.
pub fn apply(ready: &ReadyBump, dry_run: bool, json: bool) -> anyhow::Result<BumpOutcome> {
    if dry_run {
        return Ok(ready.preview());
    }

    let outcome = ready.execute().context("bump failed")?;
    if !json {
        println!(
            "  {} Version updated to {}",
            "✓".green(),
            outcome.new.to_string().green().bold()
        );
    }
    Ok(outcome)
}
