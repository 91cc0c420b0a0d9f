//! End-to-end tests for `rackplan migrate` command.

use std::process::Command;

mod fixtures;
use fixtures::*;

/// Path to the rackplan binary
fn rackplan_bin() -> &'static str {
    env!("CARGO_BIN_EXE_rackplan")
}

#[test]
fn test_migrate_legacy_json_response() {
    let (input, _temp_dir) = write_json(&legacy_layout_json());

    let output = Command::new(rackplan_bin())
        .args(["migrate", "--input", input.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result: serde_json::Value = serde_json::from_str(&stdout).expect("Should parse JSON output");

    assert_eq!(result["migrated"], true);
    assert_eq!(result["target_version"], "0.2.0");
    assert_eq!(result["id_map"]["lib-nas"], "nas");
    assert_eq!(result["id_map"]["lib-ups"], "ups");

    let layout = &result["layout"];
    assert!(layout["device_types"]["nas"].is_object());
    assert_eq!(layout["device_types"]["ups"]["colour"], "#AA3311");
    assert_eq!(layout["rack"]["name"], "Main");

    let devices = layout["rack"]["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["device_type"], "nas");
    assert_eq!(devices[0]["face"], "front");
    assert_eq!(devices[1]["face"], "rear");
    assert!(devices.iter().all(|d| d["id"].is_string()));
}

#[test]
fn test_migrate_writes_output_file() {
    let (input, temp_dir) = write_json(&v0_1_layout_json());
    let out_path = temp_dir.path().join("out").join("migrated.json");

    let output = Command::new(rackplan_bin())
        .args([
            "migrate",
            "--input",
            input.to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Migrated"), "stdout: {stdout}");

    let migrated = read_json(&out_path);
    assert_eq!(migrated["version"], "0.2.0");
    assert_eq!(migrated["rack"]["name"], "Comms");
    assert!(migrated.get("racks").is_none());
    assert!(migrated["device_types"]["switch-48"].is_object());

    // The migrated file must load cleanly.
    let validate = Command::new(rackplan_bin())
        .args(["validate", "--layout", out_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");
    assert_eq!(validate.status.code(), Some(0));
}

#[test]
fn test_migrate_current_layout_is_unchanged() {
    let (input, _temp_dir) = create_temp_layout_file(&test_layout_basic());

    let output = Command::new(rackplan_bin())
        .args(["migrate", "--input", input.to_str().unwrap(), "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(result["migrated"], false);
    assert!(result["id_map"].as_object().unwrap().is_empty());
    assert_eq!(result["layout"]["rack"]["devices"][0]["id"], "dev-server");
}

#[test]
fn test_migrate_stdout_without_output() {
    let (input, _temp_dir) = write_json(&v0_1_layout_json());

    let output = Command::new(rackplan_bin())
        .args(["migrate", "--input", input.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let migrated: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
            .expect("Plain output should be the migrated document");
    assert_eq!(migrated["version"], "0.2.0");
}

#[test]
fn test_migrate_missing_input() {
    let output = Command::new(rackplan_bin())
        .args(["migrate", "--input", "/nonexistent/old.json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"));
}
