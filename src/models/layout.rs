//! Layout document and settings.

use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::models::device_type::DeviceType;
use crate::models::rack::{PlacedDevice, Rack};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// How devices are drawn in the rack view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Coloured blocks with text labels
    #[default]
    Label,
    /// Device front/rear images
    Image,
}

/// Editor preferences stored with the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Label or image rendering
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// Overlay labels on top of images
    #[serde(default)]
    pub show_labels_on_images: bool,
    /// Draw airflow indicators
    #[serde(default)]
    pub show_airflow: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Label,
            show_labels_on_images: false,
            show_airflow: false,
        }
    }
}

/// Complete rack layout: one rack plus the device types it references.
///
/// # Validation
///
/// - every placed device references a slug present in `device_types`
/// - no two placed devices overlap on a shared face
/// - every placed device lies inside the rack's unit range
///
/// Structural rules are enforced by [`crate::validation`]; the layout itself
/// can hold violations so editors can display them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Schema version (e.g., "0.2.0")
    pub version: String,
    /// Layout name
    pub name: String,
    /// The rack being designed
    pub rack: Rack,
    /// Device type catalogue keyed by slug
    #[serde(default)]
    pub device_types: BTreeMap<String, DeviceType>,
    /// Editor settings
    #[serde(default)]
    pub settings: LayoutSettings,
}

impl Layout {
    /// Creates an empty layout around `rack` at the current schema version.
    pub fn new(name: impl Into<String>, rack: Rack) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION.to_string(),
            name: name.into(),
            rack,
            device_types: BTreeMap::new(),
            settings: LayoutSettings::default(),
        }
    }

    /// Looks up a device type by slug.
    #[must_use]
    pub fn device_type(&self, slug: &str) -> Option<&DeviceType> {
        self.device_types.get(slug)
    }

    /// Adds a device type; fails if the slug is already defined.
    pub fn add_device_type(&mut self, device_type: DeviceType) -> Result<()> {
        if self.device_types.contains_key(&device_type.slug) {
            anyhow::bail!("Device type '{}' already exists", device_type.slug);
        }
        self.device_types
            .insert(device_type.slug.clone(), device_type);
        Ok(())
    }

    /// Device type of a placed device, if it resolves.
    #[must_use]
    pub fn device_type_of(&self, device: &PlacedDevice) -> Option<&DeviceType> {
        self.device_types.get(&device.device_type)
    }

    /// Placed devices referencing `slug`.
    pub fn placements_of<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a PlacedDevice> + 'a {
        self.rack.devices.iter().filter(move |d| d.device_type == slug)
    }

    /// All slugs currently defined.
    #[must_use]
    pub fn slugs(&self) -> HashSet<String> {
        self.device_types.keys().cloned().collect()
    }

    /// Lowercased display names of all defined device types.
    #[must_use]
    pub fn display_names(&self) -> HashSet<String> {
        self.device_types
            .values()
            .map(|d| d.display_name().to_lowercase())
            .collect()
    }
}
