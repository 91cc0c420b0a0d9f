//! Built-in catalogue of common device types.
//!
//! The catalogue is embedded in the binary at compile time and parsed once,
//! on first access, into a process-wide immutable [`StarterLibrary`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::{DeviceCategory, DeviceType};

/// Schema of `devices.json`.
#[derive(Debug, Deserialize)]
struct StarterDatabase {
    version: String,
    devices: Vec<DeviceType>,
}

/// Starter device types with lookup by slug.
#[derive(Debug, Clone)]
pub struct StarterLibrary {
    version: String,
    devices: Vec<DeviceType>,
    lookup: HashMap<String, usize>,
}

impl StarterLibrary {
    /// Parses the embedded catalogue.
    pub fn load() -> Result<Self> {
        let json_data = include_str!("devices.json");
        let db: StarterDatabase =
            serde_json::from_str(json_data).context("Failed to parse embedded devices.json")?;

        let mut lookup = HashMap::new();
        for (idx, device) in db.devices.iter().enumerate() {
            if lookup.insert(device.slug.clone(), idx).is_some() {
                anyhow::bail!("Duplicate starter device slug '{}'", device.slug);
            }
        }

        Ok(Self {
            version: db.version,
            devices: db.devices,
            lookup,
        })
    }

    /// Catalogue version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All device types, in catalogue order.
    #[must_use]
    pub fn devices(&self) -> &[DeviceType] {
        &self.devices
    }

    /// Looks up a device type by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&DeviceType> {
        self.lookup.get(slug).map(|&idx| &self.devices[idx])
    }

    /// Device types of one category, in catalogue order.
    pub fn by_category(&self, category: DeviceCategory) -> impl Iterator<Item = &DeviceType> {
        self.devices.iter().filter(move |d| d.category == category)
    }
}

/// Shared starter library, parsed on first use.
///
/// # Examples
///
/// ```
/// use rackplan::starter_library::starter_library;
///
/// let library = starter_library();
/// assert!(library.get("1u-blank").is_some());
/// ```
#[must_use]
pub fn starter_library() -> &'static StarterLibrary {
    static LIBRARY: OnceLock<StarterLibrary> = OnceLock::new();
    LIBRARY.get_or_init(|| StarterLibrary::load().expect("embedded starter library is valid"))
}
