//! End-to-end tests for `rackplan validate` command.

use std::process::Command;

mod fixtures;
use fixtures::*;

/// Path to the rackplan binary
fn rackplan_bin() -> &'static str {
    env!("CARGO_BIN_EXE_rackplan")
}

fn validate_json(path: &std::path::Path) -> (Option<i32>, serde_json::Value) {
    let output = Command::new(rackplan_bin())
        .args(["validate", "--layout", path.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let result = serde_json::from_str(&stdout).expect("Should parse JSON output");
    (output.status.code(), result)
}

#[test]
fn test_validate_valid_layout() {
    let (layout_path, _temp_dir) = create_temp_layout_file(&test_layout_basic());

    let output = Command::new(rackplan_bin())
        .args(["validate", "--layout", layout_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Valid layout should exit with code 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Validation passed"));
}

#[test]
fn test_validate_valid_layout_json() {
    let (layout_path, _temp_dir) = create_temp_layout_file(&test_layout_basic());

    let (code, result) = validate_json(&layout_path);

    assert_eq!(code, Some(0));
    assert_eq!(result["valid"], true);
    assert_eq!(result["migrated"], false);
    assert_eq!(result["errors"].as_array().unwrap().len(), 0);
    assert_eq!(result["checks"]["structure"], "passed");
    assert_eq!(result["checks"]["placement"], "passed");
    assert_eq!(result["checks"]["airflow"], "passed");
}

#[test]
fn test_validate_overlap_fails() {
    let (layout_path, _temp_dir) = create_temp_layout_file(&test_layout_with_overlap());

    let (code, result) = validate_json(&layout_path);

    assert_eq!(code, Some(1), "Overlapping devices should exit with code 1");
    assert_eq!(result["valid"], false);
    assert_eq!(result["checks"]["placement"], "failed");

    let errors = result["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e["kind"] == "overlap" && e["severity"] == "error"));
}

#[test]
fn test_validate_dangling_reference_fails() {
    let (layout_path, _temp_dir) = create_temp_layout_file(&test_layout_with_dangling_reference());

    let (code, result) = validate_json(&layout_path);

    assert_eq!(code, Some(1));
    assert_eq!(result["checks"]["references"], "failed");
    let errors = result["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e["kind"] == "dangling_reference" && e["device_id"] == "dev-ghost"));
}

#[test]
fn test_validate_airflow_conflict_is_warning() {
    let (layout_path, _temp_dir) = create_temp_layout_file(&test_layout_with_airflow_conflict());

    let (code, result) = validate_json(&layout_path);

    assert_eq!(code, Some(0), "Warnings alone should not fail validation");
    assert_eq!(result["valid"], true);
    assert_eq!(result["checks"]["airflow"], "warning");
    let errors = result["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["severity"], "warning");
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let (layout_path, _temp_dir) = create_temp_layout_file(&test_layout_with_airflow_conflict());

    let output = Command::new(rackplan_bin())
        .args([
            "validate",
            "--layout",
            layout_path.to_str().unwrap(),
            "--strict",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("strict"), "stderr: {stderr}");
}

#[test]
fn test_validate_migrates_legacy_layout() {
    let (layout_path, _temp_dir) = write_json(&legacy_layout_json());

    let (code, result) = validate_json(&layout_path);

    assert_eq!(code, Some(0));
    assert_eq!(result["valid"], true);
    assert_eq!(result["migrated"], true);
    assert!(result["source_version"]
        .as_str()
        .unwrap()
        .starts_with("legacy"));
}

#[test]
fn test_validate_missing_rack_height() {
    let mut value = serde_json::to_value(test_layout_basic()).unwrap();
    value["rack"].as_object_mut().unwrap().remove("height");
    let (layout_path, _temp_dir) = write_json(&value);

    let (code, result) = validate_json(&layout_path);

    assert_eq!(code, Some(1));
    assert_eq!(result["checks"]["structure"], "failed");
    assert!(result["errors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["kind"] == "missing_field"));
}

#[test]
fn test_validate_file_not_found() {
    let output = Command::new(rackplan_bin())
        .args(["validate", "--layout", "/nonexistent/layout.json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2), "Missing file should exit with code 2");
}

#[test]
fn test_validate_malformed_json() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    write_text(&path, "{ not json");

    let output = Command::new(rackplan_bin())
        .args(["validate", "--layout", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}
