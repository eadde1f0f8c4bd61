//! Core library for gitver.
//!
//! Bumps the semantic version declared in a project file and commits the
//! change. The `gitver` CLI is a thin display layer over this crate.
//!
//! # Modules
//!
//! - [`version`] - Version model and bump transitions
//! - [`project`] - Supported project kinds and their declaration lines
//! - [`scan`] - Locate the version declaration in a file
//! - [`rewrite`] - Atomically replace the declaration line
//! - [`search`] - Find the declaration file under a directory
//! - [`bump`] - Plan and execute a bump
//! - [`detect`] - Project kind detection
//! - [`git`] / [`commit`] - Stage and commit the result
//! - [`config`] - Configuration loading
//! - [`paths`] - User path resolution
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use gitver_core::{BumpOp, ProjectKind, bump};
//!
//! let outcome = bump::bump(
//!     BumpOp::Minor,
//!     Utf8Path::new("."),
//!     ProjectKind::Rust.declaration(),
//!     None,
//! )
//! .expect("bump failed");
//! println!("{} -> {}", outcome.previous, outcome.new);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod commit;

pub mod config;

pub mod detect;

pub mod error;

pub mod git;

pub mod paths;

pub mod project;

pub mod rewrite;

pub mod scan;

pub mod search;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use project::ProjectKind;

pub use version::{BumpOp, Version};
