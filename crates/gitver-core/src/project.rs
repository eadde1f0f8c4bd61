//! Project kinds and their version declarations.
//!
//! Each [`ProjectKind`] maps to a [`Declaration`]: the file that carries the
//! version, a [`LineMatcher`] that recognizes the declaring line, and a
//! [`LineFormatter`] that renders its replacement. The set is closed so every
//! supported kind can be enumerated and tested.
//!
//! Formatters splice the new version over the old value's bytes, so
//! indentation, quote style, neighbouring arguments and trailing comments on
//! the declaring line survive a bump.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::version::{Version, VersionResult};

/// Key that names the version in every supported declaration style.
const VERSION_KEY: &str = "version";

/// Recognizes a version declaration in a single line of text.
///
/// Returns `Ok(None)` when the line is not the declaration, and an error
/// when it is but its value does not parse.
pub type LineMatcher = fn(&str) -> VersionResult<Option<Version>>;

/// Renders the replacement for a declaring line (without terminator).
///
/// Called with the current line and the new version string. A line that
/// holds no declaration gets the canonical declaration for its style.
pub type LineFormatter = fn(&str, &str) -> String;

/// Where and how a project declares its version.
#[derive(Clone, Copy)]
pub struct Declaration {
    /// File name to search for.
    pub file_name: &'static str,
    /// Finds and parses the declaring line.
    pub matcher: LineMatcher,
    /// Renders the new declaring line.
    pub formatter: LineFormatter,
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// A supported project type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// Rust crate (`Cargo.toml`).
    Rust,
    /// Python package built with setuptools (`setup.py`).
    Python,
    /// Python package described by `pyproject.toml`.
    Pyproject,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rust => write!(f, "rust"),
            Self::Python => write!(f, "python"),
            Self::Pyproject => write!(f, "pyproject"),
        }
    }
}

impl ProjectKind {
    /// All kinds, in detection priority order.
    pub const ALL: &[Self] = &[Self::Rust, Self::Pyproject, Self::Python];

    /// The declaration for this kind.
    pub const fn declaration(self) -> Declaration {
        match self {
            Self::Rust => Declaration {
                file_name: "Cargo.toml",
                matcher: match_toml_key,
                formatter: format_toml_key,
            },
            Self::Python => Declaration {
                file_name: "setup.py",
                matcher: match_call_argument,
                formatter: format_call_argument,
            },
            Self::Pyproject => Declaration {
                file_name: "pyproject.toml",
                matcher: match_toml_key,
                formatter: format_toml_key,
            },
        }
    }

    /// Shorthand for `self.declaration().file_name`.
    pub const fn file_name(self) -> &'static str {
        self.declaration().file_name
    }
}

/// Matches `version = "x.y.z"`.
pub fn match_toml_key(line: &str) -> VersionResult<Option<Version>> {
    toml_value_span(line)
        .map(|span| Version::parse(&line[span]))
        .transpose()
}

/// Puts `version` in place of the value on a `version = "x.y.z"` line.
pub fn format_toml_key(line: &str, version: &str) -> String {
    match toml_value_span(line) {
        Some(span) => splice(line, span, version),
        None => format!("{VERSION_KEY} = \"{version}\""),
    }
}

/// Matches a `version=` keyword argument in a call such as `setup(...)`.
pub fn match_call_argument(line: &str) -> VersionResult<Option<Version>> {
    call_argument_span(line)
        .map(|span| Version::parse(&line[span]))
        .transpose()
}

/// Puts `version` in place of the value of a `version=` keyword argument.
pub fn format_call_argument(line: &str, version: &str) -> String {
    match call_argument_span(line) {
        Some(span) => splice(line, span, version),
        None => format!("    {VERSION_KEY}='{version}',"),
    }
}

/// Byte range of the value in a `version = ...` line.
fn toml_value_span(line: &str) -> Option<Range<usize>> {
    if is_skippable(line.trim()) {
        return None;
    }
    let eq = line.find('=')?;
    if clean_key(&line[..eq]) != VERSION_KEY {
        return None;
    }
    Some(value_span(line, eq + 1..line.len()))
}

/// Byte range of the value of the first `version=` argument on the line.
fn call_argument_span(line: &str) -> Option<Range<usize>> {
    if is_skippable(line.trim()) {
        return None;
    }
    let mut start = 0;
    for (i, c) in line
        .char_indices()
        .chain(std::iter::once((line.len(), ',')))
    {
        if !matches!(c, ',' | '(' | ')') {
            continue;
        }
        let argument = start..i;
        start = i + c.len_utf8();

        let Some(eq) = line[argument.clone()].find('=').map(|eq| argument.start + eq) else {
            continue;
        };
        let key = &line[argument.start..eq];
        // `==`, `!=`, `<=` and `>=` compare, they do not assign
        if line[eq + 1..].starts_with('=')
            || key.trim_end().ends_with(['!', '<', '>'])
            || clean_key(key) != VERSION_KEY
        {
            continue;
        }
        return Some(value_span(line, eq + 1..argument.end));
    }
    None
}

/// Narrow `region` to the value itself: no comment, no quotes or punctuation
/// around it. Inner hyphens and dots are kept.
fn value_span(line: &str, region: Range<usize>) -> Range<usize> {
    let text = &line[region.clone()];
    let text = text.split('#').next().unwrap_or_default();
    let Some(first) = text.find(|c: char| c.is_ascii_alphanumeric()) else {
        return region.start..region.start;
    };
    let last = text
        .rfind(|c: char| c.is_ascii_alphanumeric())
        .unwrap_or(first);
    region.start + first..region.start + last + 1
}

fn splice(line: &str, span: Range<usize>, version: &str) -> String {
    let mut out = String::with_capacity(line.len() + version.len());
    out.push_str(&line[..span.start]);
    out.push_str(version);
    out.push_str(&line[span.end..]);
    out
}

/// Blank lines, comments and `[section]` headers never declare a version.
fn is_skippable(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Keep only the characters that can form an identifier or dotted key.
fn clean_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(matcher: LineMatcher, line: &str) -> Option<String> {
        matcher(line).unwrap().map(|v| v.to_string())
    }

    #[test]
    fn kind_display_and_file_names() {
        assert_eq!(ProjectKind::Rust.to_string(), "rust");
        assert_eq!(ProjectKind::Rust.file_name(), "Cargo.toml");
        assert_eq!(ProjectKind::Python.file_name(), "setup.py");
        assert_eq!(ProjectKind::Pyproject.file_name(), "pyproject.toml");
    }

    #[test]
    fn every_kind_formats_what_it_matches() {
        for kind in ProjectKind::ALL {
            let decl = kind.declaration();
            let line = (decl.formatter)("", "4.5.6-alpha2");
            assert_eq!(
                matched(decl.matcher, &line).as_deref(),
                Some("4.5.6-alpha2"),
                "{kind} formatter output should round-trip: {line}"
            );
        }
    }

    #[test]
    fn toml_matches_version_key() {
        assert_eq!(
            matched(match_toml_key, r#"version = "1.0.0""#).as_deref(),
            Some("1.0.0")
        );
        assert_eq!(
            matched(match_toml_key, "  version=\"0.3.1-alpha2\"  \n").as_deref(),
            Some("0.3.1-alpha2")
        );
        assert_eq!(
            matched(match_toml_key, r#"version = "2.1.0" # keep in sync"#).as_deref(),
            Some("2.1.0")
        );
    }

    #[test]
    fn toml_skips_headers_blanks_and_comments() {
        for line in ["[package]", "[[bin]]", "", "   ", "# version = \"9.9.9\""] {
            assert_eq!(matched(match_toml_key, line), None, "line: {line:?}");
        }
    }

    #[test]
    fn toml_ignores_other_keys() {
        for line in [
            r#"name = "gitver""#,
            "version.workspace = true",
            r#"serde = { version = "1.0", features = ["derive"] }"#,
            r#"rust-version = "1.88.0""#,
        ] {
            assert_eq!(matched(match_toml_key, line), None, "line: {line:?}");
        }
    }

    #[test]
    fn toml_reports_unparsable_value() {
        assert!(match_toml_key(r#"version = "1.0""#).is_err());
    }

    #[test]
    fn call_argument_matches_keyword() {
        assert_eq!(
            matched(match_call_argument, "    version='2.0.0',").as_deref(),
            Some("2.0.0")
        );
        assert_eq!(
            matched(match_call_argument, r#"setup(name="demo", version="0.1.2-alpha3")"#)
                .as_deref(),
            Some("0.1.2-alpha3")
        );
    }

    #[test]
    fn call_argument_ignores_lookalikes() {
        for line in [
            "    python_requires='>=3.6',",
            "    python_version='3.8',",
            "if version == '1.0.0':",
            "assert version != '1.0.0'",
            "setup(",
            "[metadata]",
        ] {
            assert_eq!(matched(match_call_argument, line), None, "line: {line:?}");
        }
    }

    #[test]
    fn formatters_render_canonical_lines() {
        assert_eq!(format_toml_key("", "1.2.3"), r#"version = "1.2.3""#);
        assert_eq!(format_call_argument("", "1.2.3"), "    version='1.2.3',");
    }

    #[test]
    fn toml_formatter_keeps_indent_quotes_and_comment() {
        assert_eq!(
            format_toml_key(r#"  version = "2.1.0" # keep in sync with docs"#, "2.2.0"),
            r#"  version = "2.2.0" # keep in sync with docs"#
        );
        assert_eq!(
            format_toml_key("version='0.1.0-alpha3'", "0.1.0"),
            "version='0.1.0'"
        );
    }

    #[test]
    fn call_formatter_keeps_the_rest_of_the_call() {
        assert_eq!(
            format_call_argument(
                r#"setup(name="demo", version="0.1.2", packages=["demo"])"#,
                "0.1.3"
            ),
            r#"setup(name="demo", version="0.1.3", packages=["demo"])"#
        );
        assert_eq!(
            format_call_argument("        version = \"1.0.0\",  # released", "1.1.0"),
            "        version = \"1.1.0\",  # released"
        );
    }

    #[test]
    fn call_argument_skips_earlier_lookalikes() {
        let line = "setup(python_version='3.8', version='1.4.0')";
        assert_eq!(matched(match_call_argument, line).as_deref(), Some("1.4.0"));
        assert_eq!(
            format_call_argument(line, "1.5.0"),
            "setup(python_version='3.8', version='1.5.0')"
        );
    }

    #[test]
    fn serde_kind_is_lowercase() {
        let json = serde_json::to_string(&ProjectKind::Pyproject).unwrap();
        assert_eq!(json, "\"pyproject\"");
    }
}
