//! Integration tests for `typepatch explain --json` output.

use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "typepatch-cli", "--bin", "typepatch", "--"]);
    cmd
}

fn explain(dir: &std::path::Path, subpath: &str) -> (serde_json::Value, bool) {
    let output = cargo_bin()
        .args(["explain", subpath, "--prefer", "require", "--json", "--cwd"])
        .arg(dir)
        .output()
        .expect("Failed to run explain command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    (json, output.status.success())
}

#[test]
fn test_explain_reports_trail_and_disposition() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"exports": {"./sub": {"node": {"require": "./cjs/sub.cjs"}, "default": "./esm/sub.mjs"}}}"#,
    )
    .unwrap();

    let (json, success) = explain(dir.path(), "sub");
    assert!(success);
    assert_eq!(json["ok"], true);
    assert_eq!(json["explain"]["subpath"], "./sub");
    assert_eq!(json["explain"]["disposition"], "redirect");
    assert_eq!(json["explain"]["main"], "./cjs/sub.cjs");
    assert_eq!(json["explain"]["trail"], serde_json::json!(["node", "require"]));
}

#[test]
fn test_explain_unknown_subpath() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"exports": {"./sub": "./dist/sub.js"}}"#,
    )
    .unwrap();

    let (json, success) = explain(dir.path(), "./missing");
    assert!(!success);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "SUBPATH_NOT_EXPORTED");
}
