//! Legacy (pre-0.1) documents: free-form device library keyed by generated ids.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::models::slug::{slug_from_parts, unique_imported_name, unique_slug};
use crate::models::{Airflow, DeviceCategory};

/// Device library entry as written by legacy versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLibraryEntry {
    id: String,
    #[serde(default)]
    name: String,
    height: f64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "color")]
    colour: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default, alias = "is_full_depth")]
    is_full_depth: Option<bool>,
    #[serde(default)]
    airflow: Option<String>,
}

/// Converts a legacy document into the 0.1 shape.
///
/// Library entries become a `device_types` array keyed by generated slugs and
/// every rack device's `libraryId` is replaced by the matching `device_type`.
/// Returns the old-id to slug map alongside the converted document.
pub(super) fn to_v0_1(root: &mut Map<String, Value>) -> BTreeMap<String, String> {
    let library = match root.remove("deviceLibrary") {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };

    let mut id_map = BTreeMap::new();
    let mut taken_slugs: HashSet<String> = HashSet::new();
    let mut taken_names: HashSet<String> = HashSet::new();
    let mut device_types = Vec::with_capacity(library.len());

    for raw in library {
        let entry: LegacyLibraryEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable legacy library entry: {e}");
                continue;
            }
        };

        let mut name = entry.name.trim().to_string();
        let mut slug = slug_from_parts(
            entry.manufacturer.as_deref(),
            entry.model.as_deref(),
            Some(&name),
        );
        if taken_slugs.contains(&slug) {
            if !name.is_empty() {
                name = unique_imported_name(&name, &taken_names);
                slug = slug_from_parts(
                    entry.manufacturer.as_deref(),
                    entry.model.as_deref(),
                    Some(&name),
                );
            }
            slug = unique_slug(&slug, &taken_slugs);
        }
        taken_slugs.insert(slug.clone());
        taken_names.insert(name.to_lowercase());

        let category = entry
            .category
            .as_deref()
            .and_then(DeviceCategory::parse)
            .unwrap_or(DeviceCategory::Other);
        let airflow = entry
            .airflow
            .as_deref()
            .and_then(Airflow::parse)
            .unwrap_or_default();
        let model = entry
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| Some(name.clone()).filter(|n| !n.is_empty()));

        let mut device_type = json!({
            "slug": slug,
            "u_height": entry.height,
            "category": category.as_str(),
            "is_full_depth": entry.is_full_depth.unwrap_or(true),
            "airflow": airflow.as_str(),
        });
        if let Some(obj) = device_type.as_object_mut() {
            for (key, value) in [
                ("manufacturer", entry.manufacturer),
                ("model", model),
                ("colour", entry.colour),
                ("notes", entry.notes),
            ] {
                if let Some(value) = value {
                    obj.insert(key.to_string(), Value::String(value));
                }
            }
        }

        id_map.insert(entry.id, slug);
        device_types.push(device_type);
    }

    root.insert("device_types".to_string(), Value::Array(device_types));

    if let Some(Value::Array(racks)) = root.get_mut("racks") {
        for rack in racks.iter_mut().filter_map(Value::as_object_mut) {
            remap_rack_devices(rack, &id_map);
        }
    }

    id_map
}

fn remap_rack_devices(rack: &mut Map<String, Value>, id_map: &BTreeMap<String, String>) {
    let Some(Value::Array(devices)) = rack.get_mut("devices") else {
        return;
    };

    devices.retain_mut(|device| {
        let Some(device) = device.as_object_mut() else {
            return false;
        };
        if device.contains_key("device_type") {
            return true;
        }
        let library_id = device
            .remove("libraryId")
            .and_then(|v| v.as_str().map(String::from));
        match library_id.as_deref().and_then(|id| id_map.get(id)) {
            Some(slug) => {
                device.insert("device_type".to_string(), Value::String(slug.clone()));
                true
            }
            None => {
                warn!(
                    "Dropping placed device with unknown library id {:?}",
                    library_id.unwrap_or_default()
                );
                false
            }
        }
    });
}
