//! E2E CLI tests for `vitae inspect`, `vitae completions` and help output.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn vitae_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitae"));
    cmd.current_dir(dir);
    cmd.env("VITAE_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env_remove("FORMAT");
    cmd
}

fn inspect_json(dir: &Path) -> Value {
    let output = vitae_cmd(dir)
        .args(["inspect", "--dir", ".", "--json"])
        .output()
        .expect("inspect should not crash");
    assert!(
        output.status.success(),
        "inspect failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("inspect --json should produce valid JSON")
}

#[test]
fn inspect_reports_index_shape() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("a.txt"), "rust engineer tokio").expect("write");
    fs::write(dir.path().join("b.md"), "python engineer django").expect("write");
    fs::write(dir.path().join("notes.pdf"), "ignored").expect("write");

    let json = inspect_json(dir.path());
    assert_eq!(json["documents"], 2);
    assert_eq!(json["excluded"], 0);
    assert_eq!(json["vocabulary"], 5);
    assert_eq!(json["embedder"], "hashing-384");
    assert_eq!(json["dimension"], 384);
    assert_eq!(json["config"]["hybrid"]["alpha"], 0.5);
    assert_eq!(json["config"]["lexical"]["k1"], 1.5);
}

#[test]
fn inspect_lists_unreadable_files() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("good.txt"), "rust engineer").expect("write");
    fs::write(dir.path().join("bad.txt"), [0xff_u8, 0xfe]).expect("write");

    let json = inspect_json(dir.path());
    assert_eq!(json["documents"], 1);
    assert_eq!(json["excluded"], 1);
    let skipped = json["skipped"].as_array().expect("skipped array");
    assert_eq!(skipped.len(), 1);
    assert!(
        skipped[0]["path"]
            .as_str()
            .expect("path")
            .ends_with("bad.txt")
    );
}

#[test]
fn inspect_uses_configured_dimension() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("a.txt"), "rust engineer").expect("write");
    fs::write(
        dir.path().join("custom.toml"),
        "[embedder]\nkind = \"hashing\"\ndimension = 64\n",
    )
    .expect("write config");

    let output = vitae_cmd(dir.path())
        .args(["inspect", "--config", "custom.toml", "--format", "json"])
        .output()
        .expect("inspect should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["dimension"], 64);
    assert_eq!(json["embedder"], "hashing-64");
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().expect("tempdir");

    vitae_cmd(dir.path())
        .args(["inspect", "--config", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn inspect_text_summary() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("a.txt"), "rust engineer").expect("write");

    vitae_cmd(dir.path())
        .args(["inspect", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("documents=1  excluded=0  vocabulary=2"));
}

#[test]
fn completions_generate_script() {
    let dir = TempDir::new().expect("tempdir");

    vitae_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vitae"));
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().expect("tempdir");

    vitae_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rank"))
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn rank_help_shows_examples() {
    let dir = TempDir::new().expect("tempdir");

    vitae_cmd(dir.path())
        .args(["rank", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EXAMPLES:"));
}
