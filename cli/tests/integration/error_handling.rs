//! Error handling integration tests for the bro CLI.
//!
//! These tests verify:
//! - Commands that need a project fail outside of one
//! - Template lookups and name validation
//! - Path validation for `add`
//! - Exit codes (2 for invalid input)

#[path = "../common/mod.rs"]
mod common;

use common::Sandbox;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_add_outside_project() {
    let sb = Sandbox::new();
    sb.write("a.txt", "a");

    sb.bro()
        .arg("add")
        .arg("a.txt")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not a bro project"));
}

#[test]
fn test_add_requires_paths() {
    let sb = Sandbox::new();
    sb.bro().arg("init").assert().success();

    sb.bro().arg("add").assert().failure();
}

#[test]
fn test_add_missing_path() {
    let sb = Sandbox::new();
    sb.bro().arg("init").assert().success();

    sb.bro()
        .arg("add")
        .arg("ghost.txt")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("path does not exist"));

    assert!(!sb.stage().exists());
}

#[test]
fn test_add_path_outside_project_root() {
    let sb = Sandbox::new();
    let project = sb.work.path().join("project");
    fs::create_dir_all(project.join(".bro")).unwrap();
    sb.write("outside.txt", "x");

    sb.bro_in(&project)
        .arg("add")
        .arg("../outside.txt")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("outside the project root"));
}

#[test]
fn test_create_existing_template() {
    let sb = Sandbox::new();
    fs::create_dir(sb.template("dup")).unwrap();

    sb.bro()
        .arg("create")
        .arg("dup")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_track_missing_template() {
    let sb = Sandbox::new();

    sb.bro()
        .arg("track")
        .arg("nope")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));

    assert!(!sb.work.path().join(".bro").exists());
}

#[test]
fn test_invalid_template_name() {
    let sb = Sandbox::new();

    sb.bro()
        .arg("create")
        .arg("../escape")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid template name"));
}

#[test]
fn test_clone_missing_template() {
    let sb = Sandbox::new();

    sb.bro()
        .arg("clone")
        .arg("nope")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_commit_untracked() {
    let sb = Sandbox::new();
    sb.bro().arg("init").assert().success();

    sb.bro()
        .arg("commit")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("project not tracked"));
}

#[test]
fn test_commit_template_removed() {
    let sb = Sandbox::new();
    sb.create_template("gone");
    fs::remove_dir(sb.template("gone")).unwrap();

    sb.bro()
        .arg("commit")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_corrupt_config() {
    let sb = Sandbox::new();
    sb.bro().arg("init").assert().success();
    fs::write(sb.work.path().join(".bro/bro.json"), "{not json").unwrap();

    sb.bro()
        .arg("status")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to parse project config"));
}

#[test]
fn test_scan_errors_flag_rejects_unknown_value() {
    let sb = Sandbox::new();

    sb.bro()
        .arg("--scan-errors")
        .arg("explode")
        .arg("status")
        .assert()
        .failure();
}
