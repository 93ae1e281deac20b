//! Integration tests for the imgmeta binary.
//!
//! Every test runs against its own temp directory with an explicit config
//! file, so the user's real config and cache are never touched.

use std::path::{Component, PathBuf};

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

// =============================================================================
// Test Fixtures
// =============================================================================

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Workspace whose sidecars go to `<tmp>/cache`.
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let cache = dir.path().join("cache");
        dir.child("config.toml")
            .write_str(&format!(
                "[sidecar]\ncache_dir = {:?}\n",
                cache.display().to_string()
            ))
            .expect("write config");
        dir.child("photos/a.jpg")
            .write_binary(&minimal_jpeg())
            .expect("write image");
        Self { dir }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("imgmeta").expect("binary built");
        cmd.env_remove("RUST_LOG")
            .env_remove("IMGMETA_CONFIG")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"));
        cmd
    }

    fn image(&self) -> PathBuf {
        self.dir.path().join("photos/a.jpg")
    }

    fn sidecar(&self) -> PathBuf {
        let photos = self.dir.path().join("photos");
        let mut path = self.dir.path().join("cache/metadata");
        for component in photos.components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path.join("a.jpg.gqv")
    }
}

/// SOI, APP0, SOS with a few bytes of scan data, EOI.
fn minimal_jpeg() -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    out.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    out.extend_from_slice(&[0x12, 0x34, 0x56]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

// =============================================================================
// Basic flags
// =============================================================================

#[test]
fn version_flag_works() {
    Workspace::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imgmeta"));
}

#[test]
fn tokenize_prints_one_per_line() {
    Workspace::new()
        .cmd()
        .args(["tokenize", "a, b;c\n d,a"])
        .assert()
        .success()
        .stdout("a\nb\nc\nd\n");
}

// =============================================================================
// Metadata commands
// =============================================================================

#[test]
fn read_without_metadata_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("read")
        .arg(ws.image())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No metadata found"));
}

#[test]
fn read_missing_image_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("read")
        .arg(ws.dir.path().join("photos/none.jpg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such image file"));
}

#[test]
fn write_then_read() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("write")
        .arg(ws.image())
        .args(["--keywords", "sun, beach", "--comment", "nice day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote sidecar"));

    assert!(ws.sidecar().is_file());

    ws.cmd()
        .arg("read")
        .arg(ws.image())
        .assert()
        .success()
        .stdout(predicate::str::contains("  sun\n  beach"))
        .stdout(predicate::str::contains("Comment:\n  nice day"));
}

#[test]
fn read_keywords_only() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("write")
        .arg(ws.image())
        .args(["--keywords", "x;y"])
        .assert()
        .success();

    ws.cmd()
        .arg("read")
        .arg(ws.image())
        .arg("--keywords")
        .assert()
        .success()
        .stdout("x\ny\n");

    ws.cmd()
        .arg("read")
        .arg(ws.image())
        .arg("--comment")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No comment found"));
}

#[test]
fn read_json() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("write")
        .arg(ws.image())
        .args(["--keywords", "k", "--comment", "c"])
        .assert()
        .success();

    let output = ws
        .cmd()
        .arg("read")
        .arg(ws.image())
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["keywords"], serde_json::json!(["k"]));
    assert_eq!(value["comment"], serde_json::json!("c\n"));
}

#[test]
fn set_append_concatenates() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("set")
        .arg(ws.image())
        .args(["--comment", "foo", "--keywords", "a"])
        .assert()
        .success();
    ws.cmd()
        .arg("set")
        .arg(ws.image())
        .args(["--comment", "bar", "--keywords", "a,b", "--append"])
        .assert()
        .success();

    ws.cmd()
        .arg("read")
        .arg(ws.image())
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"foo\\nbar\\n\""))
        .stdout(predicate::str::contains("\"b\""));
}

#[test]
fn set_requires_something() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("set")
        .arg(ws.image())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to set"));
}

#[test]
fn embedded_write_removes_sidecar() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("write")
        .arg(ws.image())
        .args(["--keywords", "old"])
        .assert()
        .success();
    assert!(ws.sidecar().is_file());

    ws.cmd()
        .args(["config", "set", "save_in_image_file", "true"])
        .assert()
        .success();
    ws.cmd()
        .arg("write")
        .arg(ws.image())
        .args(["--keywords", "new", "--comment", "inside"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote metadata into"));

    assert!(!ws.sidecar().exists());

    ws.cmd()
        .arg("read")
        .arg(ws.image())
        .arg("--keywords")
        .assert()
        .success()
        .stdout("new\n");
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn config_set_get_roundtrip() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "sidecar.dir_mode", "0700"])
        .assert()
        .success();

    ws.cmd()
        .args(["config", "get", "sidecar.dir_mode"])
        .assert()
        .success()
        .stdout("0700\n");

    ws.dir
        .child("config.toml")
        .assert(predicate::str::contains("dir_mode = \"0700\""));
}

#[test]
fn config_rejects_unknown_key() {
    Workspace::new()
        .cmd()
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn config_path_is_explicit_file() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn completion_generates_script() {
    Workspace::new()
        .cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imgmeta"));
}
