//! Staging and commit integration tests for the bro CLI.
//!
//! These cover the add -> status -> commit cycle and `reset`.

#[path = "../common/mod.rs"]
mod common;

use common::{Sandbox, assert_file_content, count_files_recursive};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_add_directory_mirrors_into_stage() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("root/a/file1.txt", "one");
    sb.write("root/a/b/file2.txt", "two");
    sb.write("root/c/file3.txt", "three");

    sb.bro()
        .arg("add")
        .arg("root")
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged 3 files."));

    let stage = sb.stage();
    assert_file_content(&stage.join("root/a/file1.txt"), "one");
    assert_file_content(&stage.join("root/a/b/file2.txt"), "two");
    assert_file_content(&stage.join("root/c/file3.txt"), "three");
    assert_eq!(count_files_recursive(&stage), 3);
}

#[test]
fn test_add_single_file() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("Cargo.toml", "[package]");
    sb.write("ignored.txt", "nope");

    sb.bro().arg("add").arg("Cargo.toml").assert().success();

    assert_file_content(&sb.stage().join("Cargo.toml"), "[package]");
    assert!(!sb.stage().join("ignored.txt").exists());
}

#[test]
fn test_add_whole_project_skips_bro_dir() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("src/lib.rs", "// lib");
    sb.write("notes.md", "notes");

    // Stage once so .bro/_stage already has content when adding "."
    sb.bro().arg("add").arg("notes.md").assert().success();
    sb.bro()
        .arg("add")
        .arg(".")
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged 2 files."));

    let stage = sb.stage();
    assert_file_content(&stage.join("src/lib.rs"), "// lib");
    assert_file_content(&stage.join("notes.md"), "notes");
    assert!(!stage.join(".bro").exists());
    assert_eq!(count_files_recursive(&stage), 2);
}

#[test]
fn test_add_from_subdirectory_uses_project_paths() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("src/bin/tool.rs", "fn main() {}");

    sb.bro_in(&sb.work.path().join("src"))
        .arg("add")
        .arg("bin")
        .assert()
        .success();

    assert_file_content(&sb.stage().join("src/bin/tool.rs"), "fn main() {}");
}

#[test]
fn test_add_many_files() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    for d in 0..50 {
        for f in 0..20 {
            sb.write(&format!("tree/d{d}/f{f}.txt"), &format!("{d}/{f}"));
        }
    }

    sb.bro()
        .arg("-t")
        .arg("8")
        .arg("add")
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged 1000 files."));

    assert_eq!(count_files_recursive(&sb.stage()), 1000);
    assert_file_content(&sb.stage().join("tree/d49/f19.txt"), "49/19");
}

#[test]
fn test_reset_clears_stage() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("a.txt", "a");
    sb.bro().arg("add").arg("a.txt").assert().success();
    assert!(sb.stage().exists());

    sb.bro()
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged files removed."));

    assert!(!sb.stage().exists());
}

#[test]
fn test_reset_without_stage() {
    let sb = Sandbox::new();
    sb.bro().arg("init").assert().success();

    sb.bro().arg("reset").assert().success();
}

#[test]
fn test_status_lists_staged_files() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("b.txt", "b");
    sb.write("dir/a.txt", "a");
    sb.bro()
        .arg("add")
        .arg("b.txt")
        .arg("dir")
        .assert()
        .success();

    sb.bro()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files to commit to template:"))
        .stdout(predicate::str::contains("./b.txt"))
        .stdout(predicate::str::contains("./dir/a.txt"));
}

#[test]
fn test_commit_moves_stage_into_template() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("src/main.rs", "fn main() {}");
    sb.write("README.md", "# readme");
    sb.bro()
        .arg("add")
        .arg("src")
        .arg("README.md")
        .assert()
        .success();

    sb.bro()
        .arg("commit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed 2 files to \"tpl\"."));

    let template = sb.template("tpl");
    assert_file_content(&template.join("src/main.rs"), "fn main() {}");
    assert_file_content(&template.join("README.md"), "# readme");
    assert!(!sb.stage().exists());
}

#[test]
fn test_commit_replaces_existing_template_files() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    fs::write(
        sb.template("tpl").join("config.toml"),
        "old and much longer content",
    )
    .unwrap();
    fs::write(sb.template("tpl").join("keep.txt"), "untouched").unwrap();
    sb.write("config.toml", "new");
    sb.bro().arg("add").arg("config.toml").assert().success();

    sb.bro().arg("commit").assert().success();

    assert_file_content(&sb.template("tpl").join("config.toml"), "new");
    assert_file_content(&sb.template("tpl").join("keep.txt"), "untouched");
}

#[test]
fn test_commit_with_empty_stage() {
    let sb = Sandbox::new();
    sb.create_template("tpl");

    sb.bro()
        .arg("commit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to commit."));
}

#[test]
fn test_commit_keeps_stage_when_a_copy_fails() {
    let sb = Sandbox::new();
    sb.create_template("tpl");
    sb.write("good.txt", "good");
    sb.write("blocked/file.txt", "blocked");
    sb.bro()
        .arg("add")
        .arg("good.txt")
        .arg("blocked")
        .assert()
        .success();

    // A plain file where the template needs a directory
    fs::write(sb.template("tpl").join("blocked"), "in the way").unwrap();

    sb.bro()
        .arg("commit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning: Failed to copy"))
        .stderr(predicate::str::contains("1 of 2 files could not be copied"));

    assert_file_content(&sb.template("tpl").join("good.txt"), "good");
    assert_file_content(&sb.stage().join("blocked/file.txt"), "blocked");
}
