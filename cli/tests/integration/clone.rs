//! Clone integration tests for the bro CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{Sandbox, assert_file_content, count_files_recursive, write_file};
use predicates::prelude::*;

fn seeded_template(sb: &Sandbox, name: &str) {
    let template = sb.template(name);
    write_file(&template.join("Cargo.toml"), "[package]\nname = \"seed\"");
    write_file(&template.join("src/main.rs"), "fn main() {}");
    write_file(&template.join("src/util/mod.rs"), "// util");
}

#[test]
fn test_clone_into_default_directory() {
    let sb = Sandbox::new();
    seeded_template(&sb, "seed");

    sb.bro()
        .arg("clone")
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully cloned \"seed\""));

    let dest = sb.work.path().join("seed");
    assert_file_content(&dest.join("Cargo.toml"), "[package]\nname = \"seed\"");
    assert_file_content(&dest.join("src/main.rs"), "fn main() {}");
    assert_file_content(&dest.join("src/util/mod.rs"), "// util");
    assert_eq!(count_files_recursive(&dest), 3);
}

#[test]
fn test_clone_into_named_directory() {
    let sb = Sandbox::new();
    seeded_template(&sb, "seed");

    sb.bro()
        .arg("clone")
        .arg("seed")
        .arg("my-app")
        .assert()
        .success();

    assert_file_content(&sb.work.path().join("my-app/src/main.rs"), "fn main() {}");
    assert!(!sb.work.path().join("seed").exists());
}

#[test]
fn test_clone_empty_template() {
    let sb = Sandbox::new();
    std::fs::create_dir(sb.template("empty")).unwrap();

    sb.bro().arg("clone").arg("empty").assert().success();

    let dest = sb.work.path().join("empty");
    assert!(dest.is_dir());
    assert_eq!(count_files_recursive(&dest), 0);
}

#[test]
fn test_commit_then_clone_round_trip() {
    let sb = Sandbox::new();
    sb.create_template("kit");
    sb.write("kit/a.txt", "alpha");
    sb.write("kit/deep/b.txt", "beta");
    sb.bro().arg("add").arg("kit").assert().success();
    sb.bro().arg("commit").assert().success();

    sb.bro()
        .arg("clone")
        .arg("kit")
        .arg("copy")
        .assert()
        .success();

    let dest = sb.work.path().join("copy");
    assert_file_content(&dest.join("kit/a.txt"), "alpha");
    assert_file_content(&dest.join("kit/deep/b.txt"), "beta");
}

#[test]
fn test_clone_onto_template_keeps_its_files() {
    let sb = Sandbox::new();
    seeded_template(&sb, "seed");

    sb.bro_in(sb.home.path())
        .arg("clone")
        .arg("seed")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("destination overlaps the template"));

    assert_file_content(&sb.template("seed").join("src/main.rs"), "fn main() {}");
    assert_file_content(
        &sb.template("seed").join("Cargo.toml"),
        "[package]\nname = \"seed\"",
    );
}

#[test]
fn test_clone_inside_template_is_rejected() {
    let sb = Sandbox::new();
    seeded_template(&sb, "seed");

    sb.bro_in(&sb.template("seed"))
        .arg("clone")
        .arg("seed")
        .arg("nested")
        .assert()
        .failure()
        .code(2);

    assert!(!sb.template("seed").join("nested").exists());
    assert_eq!(count_files_recursive(&sb.template("seed")), 3);
}
