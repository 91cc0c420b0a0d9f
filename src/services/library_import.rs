//! Device library import.
//!
//! A library file is a JSON object holding a `devices` array:
//!
//! ```json
//! { "devices": [ { "name": "Web Server", "height": 2, "category": "server" } ] }
//! ```
//!
//! Entries are checked one by one; bad entries are skipped and counted while
//! the rest of the file still imports.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::constants::{MAX_IMPORT_DEVICE_HEIGHT, MIN_DEVICE_HEIGHT};
use crate::models::slug::{is_valid_colour, slug_from_parts, unique_imported_name, unique_slug};
use crate::models::{Airflow, DeviceCategory, DeviceType};

/// Outcome of importing a device library.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibraryImport {
    /// Device types ready to be added, with collision-free slugs and names
    pub devices: Vec<DeviceType>,
    /// Number of entries rejected
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct LibraryEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "color")]
    colour: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    is_full_depth: Option<bool>,
    #[serde(default)]
    airflow: Option<String>,
}

struct ValidEntry {
    name: String,
    height: f64,
    category: DeviceCategory,
    airflow: Airflow,
}

impl LibraryEntry {
    fn check(&self) -> Result<ValidEntry, String> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "name is missing or empty".to_string())?;

        let height = self.height.ok_or_else(|| "height is missing".to_string())?;
        if !(MIN_DEVICE_HEIGHT..=MAX_IMPORT_DEVICE_HEIGHT).contains(&height) {
            return Err(format!(
                "height {height}U is outside {MIN_DEVICE_HEIGHT}U..={MAX_IMPORT_DEVICE_HEIGHT}U"
            ));
        }

        let category = self
            .category
            .as_deref()
            .and_then(DeviceCategory::parse)
            .ok_or_else(|| format!("category {:?} is not recognized", self.category))?;

        if let Some(colour) = &self.colour {
            if !is_valid_colour(colour) {
                return Err(format!("colour '{colour}' is not #RRGGBB"));
            }
        }

        let airflow = match self.airflow.as_deref() {
            None => Airflow::default(),
            Some(value) => {
                Airflow::parse(value).ok_or_else(|| format!("airflow '{value}' is not recognized"))?
            }
        };

        Ok(ValidEntry {
            name: name.to_string(),
            height,
            category,
            airflow,
        })
    }
}

/// Imports device types from a library file.
///
/// `existing_names` (compared case-insensitively) and `existing_slugs` are the
/// names and slugs already present in the target layout; imported entries are
/// renamed and re-slugged to avoid them and each other.
///
/// # Errors
///
/// Returns an error only if `json` is not valid JSON or has no `devices` array.
///
/// # Examples
///
/// ```
/// use rackplan::services::library_import::import_device_library;
/// use std::collections::HashSet;
///
/// let json = r#"{ "devices": [ { "name": "", "height": 1, "category": "server" } ] }"#;
/// let import = import_device_library(json, &HashSet::new(), &HashSet::new()).unwrap();
/// assert!(import.devices.is_empty());
/// assert_eq!(import.skipped, 1);
/// ```
pub fn import_device_library(
    json: &str,
    existing_names: &HashSet<String>,
    existing_slugs: &HashSet<String>,
) -> Result<LibraryImport> {
    let root: Value = serde_json::from_str(json).context("Failed to parse device library JSON")?;
    let entries = root
        .get("devices")
        .and_then(Value::as_array)
        .context("Device library must contain a 'devices' array")?;

    let mut taken_names: HashSet<String> = existing_names.iter().map(|n| n.to_lowercase()).collect();
    let mut taken_slugs = existing_slugs.clone();
    let mut import = LibraryImport::default();

    for (idx, raw) in entries.iter().enumerate() {
        let checked = serde_json::from_value::<LibraryEntry>(raw.clone())
            .map_err(|e| e.to_string())
            .and_then(|entry| entry.check().map(|valid| (entry, valid)));

        let (entry, valid) = match checked {
            Ok(pair) => pair,
            Err(reason) => {
                warn!("Skipping device library entry {idx}: {reason}");
                import.skipped += 1;
                continue;
            }
        };

        let name = unique_imported_name(&valid.name, &taken_names);
        let slug = unique_slug(
            &slug_from_parts(entry.manufacturer.as_deref(), None, Some(&name)),
            &taken_slugs,
        );
        taken_names.insert(name.to_lowercase());
        taken_slugs.insert(slug.clone());

        debug!("Importing '{name}' as '{slug}'");
        import.devices.push(DeviceType {
            slug,
            u_height: valid.height,
            category: valid.category,
            is_full_depth: entry.is_full_depth.unwrap_or(true),
            airflow: valid.airflow,
            manufacturer: entry.manufacturer,
            model: Some(name),
            weight: None,
            weight_unit: None,
            colour: Some(
                entry
                    .colour
                    .unwrap_or_else(|| valid.category.default_colour().to_string()),
            ),
            notes: entry.notes,
        });
    }

    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_import_valid_entries() {
        let json = r##"{ "devices": [
            { "name": "Web Server", "height": 2, "category": "server" },
            { "name": "Patch 24", "height": 1, "category": "patch-panel", "colour": "#123456", "notes": "Cat6" }
        ] }"##;

        let import = import_device_library(json, &HashSet::new(), &HashSet::new()).unwrap();

        assert_eq!(import.skipped, 0);
        assert_eq!(import.devices.len(), 2);
        let server = &import.devices[0];
        assert_eq!(server.slug, "web-server");
        assert_eq!(server.display_name(), "Web Server");
        assert_eq!(server.colour.as_deref(), Some(DeviceCategory::Server.default_colour()));
        let patch = &import.devices[1];
        assert_eq!(patch.category, DeviceCategory::PatchPanel);
        assert_eq!(patch.colour.as_deref(), Some("#123456"));
        assert_eq!(patch.notes.as_deref(), Some("Cat6"));
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let json = r#"{ "devices": [
            { "name": "Server", "height": 1, "category": "server" },
            { "name": "Server", "height": 2, "category": "server" }
        ] }"#;

        let import = import_device_library(json, &names(&["Server"]), &names(&["server"])).unwrap();

        let display: Vec<_> = import.devices.iter().map(DeviceType::display_name).collect();
        assert_eq!(display, vec!["Server (imported)", "Server (imported 2)"]);
        assert_eq!(import.devices[0].slug, "server-imported");
        assert_eq!(import.devices[1].slug, "server-imported-2");
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let json = r##"{ "devices": [
            { "name": "", "height": 1, "category": "server" },
            { "name": "Tall", "height": 120, "category": "server" },
            { "name": "Tiny", "height": 0.25, "category": "server" },
            { "name": "Odd", "height": 1, "category": "toaster" },
            { "name": "Bad colour", "height": 1, "category": "server", "colour": "red" },
            { "name": "No height", "category": "server" },
            { "name": 42, "height": 1, "category": "server" },
            "not an object",
            { "name": "Good", "height": 0.5, "category": "blank" }
        ] }"##;

        let import = import_device_library(json, &HashSet::new(), &HashSet::new()).unwrap();

        assert_eq!(import.skipped, 8);
        assert_eq!(import.devices.len(), 1);
        assert_eq!(import.devices[0].slug, "good");
    }

    #[test]
    fn test_import_accepts_tall_devices_up_to_limit() {
        let json = r#"{ "devices": [ { "name": "Cabinet filler", "height": 100, "category": "other" } ] }"#;
        let import = import_device_library(json, &HashSet::new(), &HashSet::new()).unwrap();
        assert_eq!(import.devices.len(), 1);
    }

    #[test]
    fn test_slug_collision_without_name_collision() {
        let json = r#"{ "devices": [ { "name": "UPS", "height": 2, "category": "power" } ] }"#;
        let import = import_device_library(json, &HashSet::new(), &names(&["ups"])).unwrap();
        assert_eq!(import.devices[0].slug, "ups-2");
        assert_eq!(import.devices[0].display_name(), "UPS");
    }

    #[test]
    fn test_malformed_file_is_error() {
        assert!(import_device_library("{ nope", &HashSet::new(), &HashSet::new()).is_err());
        assert!(import_device_library(r#"{ "items": [] }"#, &HashSet::new(), &HashSet::new()).is_err());
        assert!(import_device_library(r#"{ "devices": {} }"#, &HashSet::new(), &HashSet::new()).is_err());
    }
}
