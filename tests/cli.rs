/*!
 * Integration tests for the snapfs binary
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn snapfs(root: &Path, args: &[&str], env: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snapfs"))
        .arg(root)
        .args(args)
        .env("APP_ENV", env)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run snapfs")
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_writes_snapshot_to_out_path() {
    let project = tempdir().unwrap();
    write_file(project.path(), "app/User.php", "<?php\nAPP_KEY=base64:abc\n");

    let output = snapfs(project.path(), &["--out", "build/snap.md"], "local");
    assert!(output.status.success(), "{:?}", output);

    let document = fs::read_to_string(project.path().join("build/snap.md")).unwrap();
    assert!(document.contains("## FILE: app/User.php"));
    assert!(document.contains("APP_KEY=***REDACTED***"));
    assert!(!document.contains("base64:abc"));
}

#[test]
fn test_production_is_refused() {
    let project = tempdir().unwrap();
    write_file(project.path(), "app/User.php", "<?php\n");

    let output = snapfs(project.path(), &[], "production");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Snapshot failed"));
    assert!(!project.path().join("project.snapshot.md").exists());
}

#[test]
fn test_no_matches_is_success() {
    let project = tempdir().unwrap();
    write_file(project.path(), "app/README", "plain");

    let output = snapfs(project.path(), &[], "local");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No files matched"));
    assert!(!project.path().join("project.snapshot.md").exists());
}

#[test]
fn test_invalid_config_fails() {
    let project = tempdir().unwrap();
    write_file(project.path(), "app/User.php", "<?php\n");
    write_file(project.path(), "snapfs.toml", "inclde = [\"app\"]\n");

    let output = snapfs(project.path(), &[], "local");
    assert!(!output.status.success());
    assert!(!project.path().join("project.snapshot.md").exists());
}
