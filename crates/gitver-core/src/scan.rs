//! Locate the version declaration inside a project file.

use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::project::LineMatcher;
use crate::version::{Version, VersionError};

/// Errors from scanning a declaration file.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Neither the path nor its absolute form is an existing file.
    #[error("no file found at {0}")]
    FileNotFound(Utf8PathBuf),

    /// The file has no line declaring a version.
    #[error("version declaration not found in {0}")]
    VersionNotFound(Utf8PathBuf),

    /// The declaring line holds a malformed version.
    #[error("{path}:{line}: {source}")]
    Format {
        /// File that was scanned.
        path: Utf8PathBuf,
        /// One-based line number, for humans.
        line: usize,
        /// The parse failure.
        #[source]
        source: VersionError,
    },

    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was scanned.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Where a version is declared and what it currently says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigLocation {
    /// Absolute path of the declaration file.
    pub path: Utf8PathBuf,
    /// Zero-based line index of the declaration.
    pub line: usize,
    /// The version found on that line.
    pub version: Version,
}

/// Scan `path` top to bottom and return the first line `matcher` accepts.
///
/// Lines are decoded lossily, so bytes that are not UTF-8 (a Latin-1
/// comment, say) never stop the scan.
#[instrument(skip(matcher), fields(%path))]
pub fn scan_file(path: &Utf8Path, matcher: LineMatcher) -> ScanResult<ConfigLocation> {
    let path = resolve_file(path)?;
    let io_err = |source| ScanError::Io {
        path: path.clone(),
        source,
    };

    let mut reader = BufReader::new(File::open(&path).map_err(io_err)?);
    let mut buf = Vec::new();
    for line in 0.. {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        match matcher(text.trim_end_matches(['\n', '\r'])) {
            Ok(Some(version)) => {
                debug!(line, %version, "found version declaration");
                return Ok(ConfigLocation {
                    path,
                    line,
                    version,
                });
            }
            Ok(None) => {}
            Err(source) => {
                return Err(ScanError::Format {
                    path,
                    line: line + 1,
                    source,
                });
            }
        }
    }

    Err(ScanError::VersionNotFound(path))
}

/// Accept the path as given, or else its absolute form.
fn resolve_file(path: &Utf8Path) -> ScanResult<Utf8PathBuf> {
    if path.is_file() {
        return Ok(crate::paths::absolutize(path).unwrap_or_else(|| path.to_path_buf()));
    }
    let absolute = crate::paths::absolutize(path)
        .filter(|p| p.is_file())
        .ok_or_else(|| ScanError::FileNotFound(path.to_path_buf()))?;
    Ok(absolute)
}
