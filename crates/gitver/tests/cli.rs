//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess and only use
//! `--no-commit` or `--dry-run`, so they need no git repository.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.arg("--color").arg("never").env_remove("RUST_LOG");
    cmd
}

fn project(file: &str, contents: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(file), contents).unwrap();
    tmp
}

fn dir(tmp: &TempDir) -> &str {
    tmp.path().to_str().unwrap()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

const CARGO: &str = "[package]\nname = \"demo\"\nversion = \"1.2.3\"\nedition = \"2024\"\n";

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("<PART>"))
        .stdout(predicate::str::contains("--separate-commits"));
}

#[test]
fn long_help_lists_environment() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GITVER_LOG_PATH"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Argument validation
// =============================================================================

#[test]
fn invalid_part_is_rejected() {
    cmd()
        .args(["bogus", "--no-commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn message_required_without_no_commit() {
    let tmp = project("Cargo.toml", CARGO);
    cmd()
        .args(["patch", "-d", dir(&tmp)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--message"));
    assert_eq!(read(&tmp.path().join("Cargo.toml")), CARGO);
}

#[test]
fn skip_flags_conflict() {
    cmd()
        .args(["patch", "-m", "x", "--no-bump", "--no-commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn missing_directory_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");
    cmd()
        .args(["patch", "--no-commit", "-d", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid project directory"));
}

// =============================================================================
// Bumping
// =============================================================================

#[test]
fn bumps_cargo_manifest_without_commit() {
    let tmp = project("Cargo.toml", CARGO);

    cmd()
        .args(["minor", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3"))
        .stdout(predicate::str::contains("1.3.0"));

    assert_eq!(
        read(&tmp.path().join("Cargo.toml")),
        CARGO.replace("1.2.3", "1.3.0")
    );
}

#[test]
fn part_is_case_insensitive() {
    let tmp = project("Cargo.toml", CARGO);

    cmd()
        .args(["MAJOR", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();

    assert!(read(&tmp.path().join("Cargo.toml")).contains("version = \"2.0.0\""));
}

#[test]
fn prerelease_aliases() {
    let tmp = project("Cargo.toml", CARGO);

    cmd()
        .args(["alpha", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();
    cmd()
        .args(["subpatch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();
    assert!(read(&tmp.path().join("Cargo.toml")).contains("version = \"1.2.3-alpha1\""));

    cmd()
        .args(["unalpha", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();
    assert_eq!(read(&tmp.path().join("Cargo.toml")), CARGO);
}

#[test]
fn json_output_reports_bump() {
    let tmp = project("Cargo.toml", CARGO);

    let output = cmd()
        .args(["patch", "--no-commit", "--json", "-d", dir(&tmp)])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["bump"]["previous"], "1.2.3");
    assert_eq!(report["bump"]["new"], "1.2.4");
    assert_eq!(report["bump"]["line"], 2);
    assert_eq!(report["commits"].as_array().unwrap().len(), 0);
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = project("Cargo.toml", CARGO);

    cmd()
        .args(["major", "-m", "release", "--dry-run", "-d", dir(&tmp)])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.0.0"))
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(read(&tmp.path().join("Cargo.toml")), CARGO);
}

#[test]
fn missing_version_line_fails_and_leaves_file() {
    let contents = "[package]\nname = \"demo\"\n";
    let tmp = project("Cargo.toml", contents);

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("version declaration not found"));

    assert_eq!(read(&tmp.path().join("Cargo.toml")), contents);
}

#[test]
fn malformed_version_fails() {
    let contents = "[package]\nversion = \"1.2\"\n";
    let tmp = project("Cargo.toml", contents);

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version"));

    assert_eq!(read(&tmp.path().join("Cargo.toml")), contents);
}

#[test]
fn detects_setup_py() {
    let contents = "from setuptools import setup\n\nsetup(\n    name='demo',\n    version='0.9.1',\n)\n";
    let tmp = project("setup.py", contents);

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();

    assert_eq!(
        read(&tmp.path().join("setup.py")),
        contents.replace("0.9.1", "0.9.2")
    );
}

#[test]
fn single_line_setup_call_keeps_other_arguments() {
    let contents = "from setuptools import setup\nsetup(name=\"demo\", version=\"0.1.2\", packages=[\"demo\"])\n";
    let tmp = project("setup.py", contents);

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();

    assert_eq!(
        read(&tmp.path().join("setup.py")),
        contents.replace("0.1.2", "0.1.3")
    );
}

#[test]
fn explicit_project_kind() {
    let tmp = project(
        "pyproject.toml",
        "[project]\nname = \"demo\"\nversion = \"3.0.0\"\n",
    );
    fs::write(tmp.path().join("Cargo.toml"), CARGO).unwrap();

    cmd()
        .args(["minor", "--no-commit", "-p", "pyproject", "-d", dir(&tmp)])
        .assert()
        .success();

    assert!(read(&tmp.path().join("pyproject.toml")).contains("version = \"3.1.0\""));
    assert_eq!(read(&tmp.path().join("Cargo.toml")), CARGO);
}

#[test]
fn undetectable_project_fails_without_terminal() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not detect project type"));
}

#[test]
fn finds_nested_declaration_within_depth() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("pkg");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("Cargo.toml"), CARGO).unwrap();

    cmd()
        .args(["patch", "--no-commit", "-p", "rust", "--max-depth", "0", "-d", dir(&tmp)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Cargo.toml found"));

    cmd()
        .args(["patch", "--no-commit", "-p", "rust", "--max-depth", "1", "-d", dir(&tmp)])
        .assert()
        .success();
    assert!(read(&nested.join("Cargo.toml")).contains("version = \"1.2.4\""));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn project_type_from_config() {
    let tmp = project("setup.py", "setup(\n    version='1.0.0',\n)\n");
    fs::write(tmp.path().join("Cargo.toml"), CARGO).unwrap();
    fs::write(tmp.path().join(".gitver.toml"), "[project]\ntype = \"python\"\n").unwrap();

    cmd()
        .args(["major", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .success();

    assert!(read(&tmp.path().join("setup.py")).contains("version='2.0.0',"));
    assert_eq!(read(&tmp.path().join("Cargo.toml")), CARGO);
}

#[test]
fn explicit_config_file() {
    let tmp = project("Cargo.toml", CARGO);
    let config = tmp.path().join("custom.yaml");
    fs::write(&config, "project:\n  search_depth: 0\n").unwrap();

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn invalid_config_fails() {
    let tmp = project("Cargo.toml", CARGO);
    fs::write(tmp.path().join("gitver.toml"), "[project]\ntype = \"cobol\"\n").unwrap();

    cmd()
        .args(["patch", "--no-commit", "-d", dir(&tmp)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));

    assert_eq!(read(&tmp.path().join("Cargo.toml")), CARGO);
}

#[test]
fn log_file_written_when_requested() {
    let tmp = project("Cargo.toml", CARGO);
    let log = tmp.path().join("logs").join("run.jsonl");

    cmd()
        .args(["patch", "--no-commit", "-l", "info", "-d", dir(&tmp)])
        .env("GITVER_LOG_PATH", &log)
        .assert()
        .success();

    let contents = read(&log);
    assert!(contents.contains("version bumped"), "log was: {contents}");
}
