//! Schema migration for serialized layouts.
//!
//! Older documents are upgraded step by step (legacy -> 0.1 -> 0.2) on a
//! `serde_json::Value` copy of the input. Every document, whatever its
//! version, is then normalized so that racks carry a `view`, and placed
//! devices carry a `face` and an `id`.

mod legacy;
mod v0_1;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::models::ImageStore;

/// Schema generation of a serialized layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "version", rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Free-form device library with generated ids (0.0.x)
    Legacy,
    /// Device types as an array and a list of racks (0.1.x)
    V0_1,
    /// Single rack and slug-keyed device types (0.2.x)
    V0_2,
    /// Version string not recognized, or none found
    Unknown(Option<String>),
}

impl SchemaVersion {
    /// Returns true if documents of this version are upgraded to the current schema.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy (0.0.x)"),
            Self::V0_1 => f.write_str("0.1.x"),
            Self::V0_2 => f.write_str("0.2.x"),
            Self::Unknown(Some(v)) => write!(f, "unknown ({v})"),
            Self::Unknown(None) => f.write_str("unknown"),
        }
    }
}

/// Detects the schema version of a serialized layout.
///
/// This is best effort. An explicit `version` string wins. Without one, a
/// `device_types` array marks a 0.1 document and a `deviceLibrary` array
/// marks a legacy one.
///
/// # Examples
///
/// ```
/// use rackplan::migration::{detect_version, SchemaVersion};
/// use serde_json::json;
///
/// assert_eq!(detect_version(&json!({ "version": "0.1.3" })), SchemaVersion::V0_1);
/// assert_eq!(detect_version(&json!({ "deviceLibrary": [] })), SchemaVersion::Legacy);
/// assert_eq!(
///     detect_version(&json!({ "version": "3.0" })),
///     SchemaVersion::Unknown(Some("3.0".to_string()))
/// );
/// ```
#[must_use]
pub fn detect_version(data: &Value) -> SchemaVersion {
    if let Some(version) = data.get("version").and_then(Value::as_str) {
        let trimmed = version.trim().trim_start_matches('v');
        let mut parts = trimmed.split('.');
        return match (parts.next(), parts.next()) {
            (Some("0"), Some("0")) => SchemaVersion::Legacy,
            (Some("0"), Some("1")) => SchemaVersion::V0_1,
            (Some("0"), Some("2")) => SchemaVersion::V0_2,
            _ => SchemaVersion::Unknown(Some(version.to_string())),
        };
    }

    if data.get("device_types").is_some_and(Value::is_array) {
        SchemaVersion::V0_1
    } else if data.get("deviceLibrary").is_some_and(Value::is_array) {
        SchemaVersion::Legacy
    } else {
        SchemaVersion::Unknown(None)
    }
}

/// Result of migrating a serialized layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    /// Upgraded and normalized document
    pub data: Value,
    /// Legacy library id -> device-type slug (empty unless migrating legacy data)
    pub id_map: BTreeMap<String, String>,
    /// Version detected on the input
    pub from: SchemaVersion,
}

impl Migration {
    /// Returns true if the input needed any transformation step.
    #[must_use]
    pub fn upgraded(&self) -> bool {
        matches!(self.from, SchemaVersion::Legacy | SchemaVersion::V0_1)
    }
}

/// Upgrades a serialized layout to the current schema.
///
/// The input is never modified. Unknown versions are normalized but keep
/// their version string. Non-object input is returned unchanged.
///
/// # Examples
///
/// ```
/// use rackplan::migration::{migrate, SchemaVersion};
/// use serde_json::json;
///
/// let old = json!({
///     "version": "0.1.0",
///     "name": "Lab",
///     "device_types": [{ "slug": "server", "u_height": 2, "category": "server" }],
///     "racks": [{ "name": "A", "height": 42, "devices": [
///         { "device_type": "server", "position": 1 }
///     ]}]
/// });
///
/// let migration = migrate(&old);
/// assert_eq!(migration.from, SchemaVersion::V0_1);
/// assert_eq!(migration.data["version"], "0.2.0");
/// assert_eq!(migration.data["rack"]["devices"][0]["face"], "front");
/// assert!(migration.data["device_types"]["server"].is_object());
/// ```
#[must_use]
pub fn migrate(data: &Value) -> Migration {
    let from = detect_version(data);
    let mut data = data.clone();
    let mut id_map = BTreeMap::new();

    if let Some(root) = data.as_object_mut() {
        if from == SchemaVersion::Legacy {
            debug!("Migrating legacy layout to 0.1");
            id_map = legacy::to_v0_1(root);
        }
        if matches!(from, SchemaVersion::Legacy | SchemaVersion::V0_1) {
            debug!("Migrating 0.1 layout to 0.2");
            v0_1::to_v0_2(root);
        }
        normalize(root);
        if from.is_known() {
            root.insert(
                "version".to_string(),
                Value::String(CURRENT_SCHEMA_VERSION.to_string()),
            );
        }
    }

    if from.is_known() && from != SchemaVersion::V0_2 {
        info!("Migrated layout from {from} to {CURRENT_SCHEMA_VERSION}");
    }

    Migration { data, id_map, from }
}

fn normalize(root: &mut Map<String, Value>) {
    if let Some(rack) = root.get_mut("rack").and_then(Value::as_object_mut) {
        normalize_rack(rack);
    }
    if let Some(Value::Array(racks)) = root.get_mut("racks") {
        for rack in racks.iter_mut().filter_map(Value::as_object_mut) {
            normalize_rack(rack);
        }
    }
}

fn normalize_rack(rack: &mut Map<String, Value>) {
    rack.entry("view")
        .or_insert_with(|| Value::String("front".to_string()));

    let Some(Value::Array(devices)) = rack.get_mut("devices") else {
        return;
    };
    for device in devices.iter_mut().filter_map(Value::as_object_mut) {
        device
            .entry("face")
            .or_insert_with(|| Value::String("front".to_string()));
        device
            .entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    }
}

/// Re-keys the device image store after a migration.
///
/// Entries whose key has no mapping in `id_map` are dropped, as are entries
/// carrying no image at all.
#[must_use]
pub fn migrate_images(images: &ImageStore, id_map: &BTreeMap<String, String>) -> ImageStore {
    images
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .filter_map(|(old, value)| id_map.get(old).map(|slug| (slug.clone(), value.clone())))
        .collect()
}
