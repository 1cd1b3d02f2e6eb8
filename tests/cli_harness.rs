//! Command-line integration harness.
//!
//! Runs the built `fleetdiag` binary as a subprocess, from inside a temp
//! directory so no local `fleetdiag.toml` leaks in.
//!
//! # What this covers
//!
//! - `classify` prints the level, and the matching rules with `--explain`
//! - `ingest` appends files to the store and reports per-file counts
//! - `--config` is honoured and a missing config file is an error
//!
//! # What this does NOT cover
//!
//! - `serve` (the router is exercised in-process by `api_harness`)
//!
//! # Running
//!
//! ```sh
//! cargo test --test cli_harness
//! ```

mod common;
use common::*;

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn fleetdiag(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fleetdiag"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run fleetdiag")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn classify_prints_level() {
    let dir = tempfile::tempdir().unwrap();
    let out = fleetdiag(dir.path(), &["classify", "P0300"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "ERROR");

    let out = fleetdiag(dir.path(), &["classify", "P0300", "status normal"]);
    assert_eq!(stdout(&out), "INFO");
}

#[test]
fn classify_explain_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = fleetdiag(dir.path(), &["classify", "--explain", "CODE:u0420", "sensor test"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["level"], "DEBUG");
    assert_eq!(json["codeFamily"], "network");
    assert_eq!(json["keywordLevel"], "DEBUG");
}

#[test]
fn ingest_appends_files_to_store() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_store_file(dir.path(), "a.log", &valid_upload());
    let second = write_store_file(dir.path(), "b.log", &format!("junk\n{}", CORPUS_VALID[0]));
    let data = dir.path().join("store/logs.json");

    let out = fleetdiag(
        dir.path(),
        &[
            "ingest",
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "--data-file",
            data.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = stdout(&out);
    assert!(text.contains("a.log: 5 entries"), "{text}");
    assert!(text.contains("b.log: 1 entries"), "{text}");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
    assert_eq!(json["logs"].as_array().map(Vec::len), Some(6));
}

#[test]
fn ingest_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("logs.json");
    let out = fleetdiag(
        dir.path(),
        &["ingest", "does-not-exist.log", "--data-file", data.to_str().unwrap()],
    );
    assert!(!out.status.success());
}

#[test]
fn config_file_changes_classification() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_store_file(
        dir.path(),
        "custom.toml",
        "[classifier]\nnetwork_default = \"ERROR\"\n",
    );
    let out = fleetdiag(dir.path(), &["--config", cfg.to_str().unwrap(), "classify", "U0420"]);
    assert_eq!(stdout(&out), "ERROR");

    let out = fleetdiag(dir.path(), &["classify", "U0420"]);
    assert_eq!(stdout(&out), "WARNING");
}

#[test]
fn local_config_file_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    write_store_file(dir.path(), "fleetdiag.toml", "[classifier]\nfallback = \"DEBUG\"\n");
    let out = fleetdiag(dir.path(), &["classify", "X9999"]);
    assert_eq!(stdout(&out), "DEBUG");
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = fleetdiag(dir.path(), &["--config", "nope.toml", "classify", "P0300"]);
    assert!(!out.status.success());
}
