//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use rackplan::models::{Airflow, DeviceCategory, DeviceType, Face, Layout, PlacedDevice, Rack};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deterministic placement so tests can assert on identifiers.
fn placed(id: &str, device_type: &str, position: u32, face: Face) -> PlacedDevice {
    PlacedDevice {
        id: id.to_string(),
        ..PlacedDevice::new(device_type, position, face)
    }
}

/// Creates a valid 12U layout with a server, a half-depth patch panel and a rear PDU.
///
/// Front view: server at U1-U2, patch panel at U10.
/// Rear view: PDU at U5, server blocking U1-U2.
pub fn test_layout_basic() -> Layout {
    let mut layout = Layout::new("Test Lab", Rack::new("Main", 12).unwrap());

    layout
        .add_device_type(
            DeviceType::new("web-server", 2.0, DeviceCategory::Server)
                .unwrap()
                .with_model("Acme", "Web Server")
                .with_airflow(Airflow::FrontToRear),
        )
        .unwrap();
    layout
        .add_device_type(
            DeviceType::new("patch-24", 1.0, DeviceCategory::PatchPanel)
                .unwrap()
                .half_depth(),
        )
        .unwrap();
    layout
        .add_device_type(
            DeviceType::new("pdu", 1.0, DeviceCategory::Power)
                .unwrap()
                .half_depth(),
        )
        .unwrap();

    layout.rack.devices = vec![
        placed("dev-server", "web-server", 1, Face::Front).with_name("web01"),
        placed("dev-patch", "patch-24", 10, Face::Front),
        placed("dev-pdu", "pdu", 5, Face::Rear),
    ];

    layout
}

/// Creates a layout where two front servers share U2.
pub fn test_layout_with_overlap() -> Layout {
    let mut layout = test_layout_basic();
    layout
        .rack
        .devices
        .push(placed("dev-clash", "web-server", 2, Face::Front));
    layout
}

/// Creates a layout referencing a device type that is not defined.
pub fn test_layout_with_dangling_reference() -> Layout {
    let mut layout = test_layout_basic();
    layout
        .rack
        .devices
        .push(placed("dev-ghost", "missing-type", 7, Face::Front));
    layout
}

/// Creates a valid layout whose stacked devices blow exhaust into an intake.
pub fn test_layout_with_airflow_conflict() -> Layout {
    let mut layout = Layout::new("Airflow", Rack::new("Main", 12).unwrap());
    layout
        .add_device_type(
            DeviceType::new("reverse", 1.0, DeviceCategory::Network)
                .unwrap()
                .with_airflow(Airflow::RearToFront),
        )
        .unwrap();
    layout
        .add_device_type(
            DeviceType::new("forward", 1.0, DeviceCategory::Server)
                .unwrap()
                .with_airflow(Airflow::FrontToRear),
        )
        .unwrap();
    layout.rack.devices = vec![
        placed("dev-reverse", "reverse", 1, Face::Front),
        placed("dev-forward", "forward", 2, Face::Front),
    ];
    layout
}

/// A legacy (0.0.x) document with a free-form device library.
pub fn legacy_layout_json() -> Value {
    json!({
        "version": "0.0.4",
        "name": "Garage",
        "deviceLibrary": [
            { "id": "lib-nas", "name": "NAS", "height": 2, "category": "storage" },
            { "id": "lib-ups", "name": "UPS", "height": 3, "category": "power", "color": "#AA3311" }
        ],
        "racks": [
            { "name": "Main", "height": 24, "devices": [
                { "libraryId": "lib-nas", "position": 1 },
                { "libraryId": "lib-ups", "position": 10, "face": "rear" }
            ]}
        ]
    })
}

/// A 0.1 document: device types as an array, racks as a list.
pub fn v0_1_layout_json() -> Value {
    json!({
        "version": "0.1.0",
        "name": "Office",
        "device_types": [
            { "slug": "switch-48", "u_height": 1, "category": "network" }
        ],
        "racks": [
            { "name": "Comms", "height": 18, "devices": [
                { "device_type": "switch-48", "position": 4 }
            ]}
        ]
    })
}

/// Writes a layout to a temp directory as `layout.json`.
///
/// # Returns
/// The file path plus the `TempDir` that must stay alive while it is used.
pub fn create_temp_layout_file(layout: &Layout) -> (PathBuf, TempDir) {
    let value = serde_json::to_value(layout).expect("Failed to serialize layout");
    write_json(&value)
}

/// Writes arbitrary JSON to a temp directory as `layout.json`.
pub fn write_json(value: &Value) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("layout.json");
    write_text(&path, &serde_json::to_string_pretty(value).unwrap());
    (path, temp_dir)
}

/// Writes text to `path`, creating parent directories.
pub fn write_text(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Reads and parses a JSON file.
pub fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("Failed to read file");
    serde_json::from_str(&content).expect("File should contain valid JSON")
}
