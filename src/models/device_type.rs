//! Device type catalogue entries.

use crate::constants::{MAX_UI_DEVICE_HEIGHT, MIN_DEVICE_HEIGHT};
use crate::models::slug::{is_valid_colour, is_valid_slug};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Functional category of a device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceCategory {
    /// Compute servers
    Server,
    /// Switches, routers, firewalls
    Network,
    /// Patch panels
    PatchPanel,
    /// PDUs and UPS units
    Power,
    /// Disk shelves and NAS
    Storage,
    /// KVM switches and consoles
    Kvm,
    /// Audio/video equipment
    AvMedia,
    /// Fans and cooling units
    Cooling,
    /// Shelves for non-rackmount gear
    Shelf,
    /// Blanking panels
    Blank,
    /// Cable management arms and brushes
    CableManagement,
    /// Anything else
    Other,
}

impl DeviceCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 12] = [
        Self::Server,
        Self::Network,
        Self::PatchPanel,
        Self::Power,
        Self::Storage,
        Self::Kvm,
        Self::AvMedia,
        Self::Cooling,
        Self::Shelf,
        Self::Blank,
        Self::CableManagement,
        Self::Other,
    ];

    /// Identifier used in serialized files (e.g., "patch-panel").
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Network => "network",
            Self::PatchPanel => "patch-panel",
            Self::Power => "power",
            Self::Storage => "storage",
            Self::Kvm => "kvm",
            Self::AvMedia => "av-media",
            Self::Cooling => "cooling",
            Self::Shelf => "shelf",
            Self::Blank => "blank",
            Self::CableManagement => "cable-management",
            Self::Other => "other",
        }
    }

    /// Parses a serialized category identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Colour assigned to new device types of this category.
    #[must_use]
    pub const fn default_colour(self) -> &'static str {
        match self {
            Self::Server => "#4A7A8C",
            Self::Network => "#7B6BA8",
            Self::PatchPanel => "#6B7B8C",
            Self::Power => "#A84A4A",
            Self::Storage => "#4A8C5C",
            Self::Kvm => "#8C7A4A",
            Self::AvMedia => "#A86B9C",
            Self::Cooling => "#4A8CA8",
            Self::Shelf => "#8C8C7A",
            Self::Blank => "#3A3A3A",
            Self::CableManagement => "#5C5C6B",
            Self::Other => "#7A7A7A",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction air moves through a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Airflow {
    /// No forced airflow
    #[default]
    Passive,
    /// Intake at the front, exhaust at the rear
    FrontToRear,
    /// Intake at the rear, exhaust at the front
    RearToFront,
    /// Lateral airflow, left to right
    LeftToRight,
    /// Lateral airflow, right to left
    RightToLeft,
    /// Side intake, rear exhaust
    SideToRear,
}

impl Airflow {
    /// All airflow values, in display order.
    pub const ALL: [Self; 6] = [
        Self::Passive,
        Self::FrontToRear,
        Self::RearToFront,
        Self::LeftToRight,
        Self::RightToLeft,
        Self::SideToRear,
    ];

    /// Identifier used in serialized files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::FrontToRear => "front-to-rear",
            Self::RearToFront => "rear-to-front",
            Self::LeftToRight => "left-to-right",
            Self::RightToLeft => "right-to-left",
            Self::SideToRear => "side-to-rear",
        }
    }

    /// Parses a serialized airflow identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == value)
    }
}

/// Unit for `DeviceType::weight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms
    Kg,
    /// Pounds
    Lb,
}

/// Catalogue entry describing a kind of rack-mounted equipment.
///
/// # Validation
///
/// - slug must match `^[a-z0-9]+(-[a-z0-9]+)*$`
/// - u_height between 0.5 and 42 in 0.5 steps when entered interactively
///   (imports accept up to 100)
/// - colour, when present, is `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    /// Unique key within a layout (e.g., "dell-r740")
    pub slug: String,
    /// Height in rack units; may be fractional (0.5 steps)
    pub u_height: f64,
    /// Functional category
    pub category: DeviceCategory,
    /// Whether the device spans the full rack depth
    #[serde(default = "default_full_depth")]
    pub is_full_depth: bool,
    /// Airflow direction
    #[serde(default)]
    pub airflow: Airflow,
    /// Manufacturer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Model name; also used as the display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Weight in `weight_unit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Unit for `weight`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
    /// Display colour (#RRGGBB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

const fn default_full_depth() -> bool {
    true
}

impl DeviceType {
    /// Creates a device type from interactive input, applying the strict UI rules.
    ///
    /// # Examples
    ///
    /// ```
    /// use rackplan::models::{DeviceCategory, DeviceType};
    ///
    /// let switch = DeviceType::new("core-switch", 1.0, DeviceCategory::Network).unwrap();
    /// assert!(switch.is_full_depth);
    /// assert_eq!(switch.occupied_units(), 1);
    ///
    /// assert!(DeviceType::new("too-tall", 48.0, DeviceCategory::Server).is_err());
    /// ```
    pub fn new(slug: impl Into<String>, u_height: f64, category: DeviceCategory) -> Result<Self> {
        let slug = slug.into();
        Self::validate_slug(&slug)?;
        Self::validate_ui_height(u_height)?;

        Ok(Self {
            slug,
            u_height,
            category,
            is_full_depth: true,
            airflow: Airflow::default(),
            manufacturer: None,
            model: None,
            weight: None,
            weight_unit: None,
            colour: Some(category.default_colour().to_string()),
            notes: None,
        })
    }

    fn validate_slug(slug: &str) -> Result<()> {
        if !is_valid_slug(slug) {
            anyhow::bail!(
                "Device slug '{slug}' must be lowercase letters and digits separated by single hyphens"
            );
        }
        Ok(())
    }

    #[allow(clippy::float_cmp)]
    fn validate_ui_height(u_height: f64) -> Result<()> {
        if !(MIN_DEVICE_HEIGHT..=MAX_UI_DEVICE_HEIGHT).contains(&u_height) {
            anyhow::bail!(
                "Device height {u_height}U must be between {MIN_DEVICE_HEIGHT}U and {MAX_UI_DEVICE_HEIGHT}U"
            );
        }
        if (u_height * 2.0).fract() != 0.0 {
            anyhow::bail!("Device height {u_height}U must be a multiple of 0.5U");
        }
        Ok(())
    }

    /// Sets the airflow direction.
    #[must_use]
    pub const fn with_airflow(mut self, airflow: Airflow) -> Self {
        self.airflow = airflow;
        self
    }

    /// Marks the device as half depth.
    #[must_use]
    pub const fn half_depth(mut self) -> Self {
        self.is_full_depth = false;
        self
    }

    /// Sets the manufacturer and model.
    #[must_use]
    pub fn with_model(mut self, manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self.model = Some(model.into());
        self
    }

    /// Sets the display colour with validation.
    pub fn with_colour(mut self, colour: impl Into<String>) -> Result<Self> {
        let colour = colour.into();
        if !is_valid_colour(&colour) {
            anyhow::bail!("Colour '{colour}' must be a hex value like #RRGGBB");
        }
        self.colour = Some(colour);
        Ok(self)
    }

    /// Number of whole rack units reserved by this device.
    ///
    /// Fractional heights round up: a 0.5U device reserves one slot.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn occupied_units(&self) -> u32 {
        (self.u_height.ceil() as u32).max(1)
    }

    /// Human-readable name: the model if set, else the slug.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.slug)
    }

    /// Colour to draw with, falling back to the category default.
    #[must_use]
    pub fn effective_colour(&self) -> &str {
        self.colour
            .as_deref()
            .unwrap_or_else(|| self.category.default_colour())
    }
}
