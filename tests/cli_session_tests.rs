//! End-to-end tests for `rackplan session` commands.

use std::path::Path;
use std::process::{Command, Output};

mod fixtures;
use fixtures::*;

/// Path to the rackplan binary
fn rackplan_bin() -> &'static str {
    env!("CARGO_BIN_EXE_rackplan")
}

fn session(dir: &Path, args: &[&str]) -> Output {
    Command::new(rackplan_bin())
        .args(["session", "--dir", dir.to_str().unwrap()])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_session_save_then_load() {
    let (layout_path, temp_dir) = create_temp_layout_file(&test_layout_basic());
    let session_dir = temp_dir.path().join("session");

    let saved = session(&session_dir, &["save", "--layout", layout_path.to_str().unwrap()]);
    assert_eq!(
        saved.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&saved.stderr)
    );
    assert!(session_dir.join("rackplan-session.json").exists());

    let loaded = session(&session_dir, &["load"]);
    assert_eq!(loaded.status.code(), Some(0));
    let layout: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&loaded.stdout)).unwrap();
    assert_eq!(layout["name"], "Test Lab");
    assert_eq!(layout["rack"]["devices"].as_array().unwrap().len(), 3);
}

#[test]
fn test_session_load_to_file() {
    let (layout_path, temp_dir) = create_temp_layout_file(&test_layout_basic());
    let session_dir = temp_dir.path().join("session");
    let restored = temp_dir.path().join("restored.json");

    session(&session_dir, &["save", "--layout", layout_path.to_str().unwrap()]);
    let loaded = session(&session_dir, &["load", "--output", restored.to_str().unwrap()]);

    assert_eq!(loaded.status.code(), Some(0));
    assert_eq!(read_json(&restored)["rack"]["name"], "Main");
}

#[test]
fn test_session_load_empty() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    let loaded = session(temp_dir.path(), &["load"]);

    assert_eq!(loaded.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&loaded.stderr);
    assert!(stderr.contains("No valid session stored"));
}

#[test]
fn test_session_clear() {
    let (layout_path, temp_dir) = create_temp_layout_file(&test_layout_basic());
    let session_dir = temp_dir.path().join("session");

    session(&session_dir, &["save", "--layout", layout_path.to_str().unwrap()]);
    let cleared = session(&session_dir, &["clear"]);

    assert_eq!(cleared.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&cleared.stdout).contains("✓ Session cleared"));
    assert!(!session_dir.join("rackplan-session.json").exists());
    assert_eq!(session(&session_dir, &["load"]).status.code(), Some(1));
}

#[test]
fn test_session_refuses_invalid_layout() {
    let (layout_path, temp_dir) = create_temp_layout_file(&test_layout_with_overlap());
    let session_dir = temp_dir.path().join("session");

    let saved = session(&session_dir, &["save", "--layout", layout_path.to_str().unwrap()]);

    assert_eq!(saved.status.code(), Some(1));
    assert!(!session_dir.join("rackplan-session.json").exists());
}

#[test]
fn test_session_corrupt_entry_is_discarded() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let entry = temp_dir.path().join("rackplan-session.json");
    write_text(&entry, "{ \"version\": \"0.2.0\", \"name\": 5 }");

    let loaded = session(temp_dir.path(), &["load"]);

    assert_eq!(loaded.status.code(), Some(1));
    assert!(!entry.exists(), "Invalid session should be cleared");
}
