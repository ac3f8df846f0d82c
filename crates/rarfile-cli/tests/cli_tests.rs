//! Integration tests for rarfile-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn rarfile_cmd() -> Command {
    cargo_bin_cmd!("rarfile")
}

#[test]
fn test_version_flag() {
    rarfile_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rarfile"));
}

#[test]
fn test_help_flag() {
    rarfile_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command-line utility"));
}

#[test]
fn test_extract_help() {
    rarfile_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract archive members"));
}

#[test]
fn test_usage_error_exits_with_one() {
    rarfile_cmd().assert().code(1);

    rarfile_cmd()
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ARCHIVE"));
}

#[test]
fn test_list_shows_header_and_members() {
    rarfile_cmd()
        .arg("list")
        .arg(fixture_path("stored.rar"))
        .assert()
        .success()
        .stdout(predicate::str::contains("File Name"))
        .stdout(predicate::str::contains("Modified"))
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("b.txt"))
        .stdout(predicate::str::contains("2025-01-14 13:26:30"));
}

#[test]
fn test_list_relative_path() {
    rarfile_cmd()
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .arg("list")
        .arg("tests/fixtures/stored.rar")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("b.txt"));
}

#[test]
fn test_list_quiet_prints_nothing() {
    rarfile_cmd()
        .arg("--quiet")
        .arg("list")
        .arg(fixture_path("stored.rar"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_list_json_output_format() {
    let output = rarfile_cmd()
        .arg("--json")
        .arg("list")
        .arg(fixture_path("stored.rar"))
        .output()
        .expect("failed to run command");

    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("invalid JSON output");
    assert_eq!(json["operation"], "list");
    assert_eq!(json["status"], "success");

    let entries = json["data"]["entries"].as_array().unwrap();
    let names: Vec<&str> = entries
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(entries[0]["size"], 12);
    assert_eq!(json["data"]["total_size"], 24);
}

#[test]
fn test_test_intact_archive() {
    rarfile_cmd()
        .arg("test")
        .arg(fixture_path("stored.rar"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Done testing"))
        .stdout(predicate::str::contains("corrupted").not());
}

#[test]
fn test_test_corrupt_archive_names_member() {
    rarfile_cmd()
        .arg("test")
        .arg(fixture_path("corrupt.rar"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "The following enclosed file is corrupted: 'b.txt'",
        ));
}

#[test]
fn test_test_corrupt_archive_quiet_still_reports() {
    rarfile_cmd()
        .arg("--quiet")
        .arg("test")
        .arg(fixture_path("corrupt.rar"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("corrupted: 'b.txt'"))
        .stdout(predicate::str::contains("Done testing").not());
}

#[test]
fn test_test_json_reports_failure() {
    let output = rarfile_cmd()
        .arg("--json")
        .arg("test")
        .arg(fixture_path("corrupt.rar"))
        .output()
        .expect("failed to run command");

    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("invalid JSON output");
    assert_eq!(json["operation"], "test");
    assert_eq!(json["status"], "error");
    assert_eq!(json["data"]["corrupted"], "b.txt");
}

#[test]
fn test_extract_creates_files() {
    let temp = TempDir::new().expect("failed to create temp dir");

    rarfile_cmd()
        .arg("extract")
        .arg(fixture_path("stored.rar"))
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"));

    assert_eq!(
        fs::read_to_string(temp.path().join("a.txt")).unwrap(),
        "hello world\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("b.txt")).unwrap(),
        "second file\n"
    );
}

#[test]
fn test_extract_into_missing_directory() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let dest = temp.path().join("nested").join("out");

    rarfile_cmd()
        .arg("--quiet")
        .arg("extract")
        .arg(fixture_path("stored.rar"))
        .arg(&dest)
        .assert()
        .success();

    assert!(dest.join("a.txt").exists());
}

#[test]
fn test_extract_member_filter() {
    let temp = TempDir::new().expect("failed to create temp dir");

    rarfile_cmd()
        .arg("extract")
        .arg(fixture_path("stored.rar"))
        .arg(temp.path())
        .arg("--member")
        .arg("b.txt")
        .assert()
        .success();

    assert!(!temp.path().join("a.txt").exists());
    assert!(temp.path().join("b.txt").exists());
}

#[test]
fn test_extract_unknown_member_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");

    rarfile_cmd()
        .arg("extract")
        .arg(fixture_path("stored.rar"))
        .arg(temp.path())
        .arg("-m")
        .arg("ghost.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost.txt"));

    assert!(!temp.path().join("a.txt").exists());
}

#[test]
fn test_extract_json_output_counts() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let output = rarfile_cmd()
        .arg("--json")
        .arg("extract")
        .arg(fixture_path("stored.rar"))
        .arg(temp.path())
        .output()
        .expect("failed to run command");

    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("invalid JSON output");
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["data"]["members_extracted"], 2);
    assert_eq!(json["data"]["bytes_extracted"], 24);
    assert_eq!(json["data"]["warnings"], serde_json::json!([]));
}

#[test]
fn test_not_a_rar_file() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let bogus = temp.path().join("notes.txt");
    fs::write(&bogus, "definitely not an archive").unwrap();

    rarfile_cmd()
        .arg("list")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("notes.txt"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_nonexistent_archive() {
    rarfile_cmd()
        .arg("test")
        .arg("/nonexistent/archive.rar")
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive.rar"));
}

#[test]
fn test_completion_bash() {
    rarfile_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("rarfile"));
}
