//! Breadth-first search for a file by name.

use std::collections::VecDeque;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument, trace};

/// Directories never descended into.
const IGNORED_DIRS: &[&str] = &[".git", "target", "node_modules"];

/// Find the shallowest file called `name` under `root`.
///
/// `max_depth` bounds how many directory levels below `root` are searched
/// (`Some(0)` checks `root` only; `None` is unbounded). Entries are visited in
/// sorted order so the result is deterministic.
#[instrument(fields(%root))]
pub fn find_file_by_name(
    name: &str,
    root: &Utf8Path,
    max_depth: Option<usize>,
) -> Option<Utf8PathBuf> {
    let mut queue = VecDeque::from([(root.to_path_buf(), 0_usize)]);

    while let Some((dir, depth)) = queue.pop_front() {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!(%candidate, depth, "found file");
            return Some(candidate);
        }
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for child in subdirectories(&dir) {
            queue.push_back((child, depth + 1));
        }
    }

    debug!(name, "file not found");
    None
}

fn subdirectories(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let entries = match dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            trace!(%dir, error = %e, "skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut dirs: Vec<Utf8PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| !IGNORED_DIRS.contains(&entry.file_name()))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    dirs.sort();
    dirs
}
