//! Rack and device placement data structures.

use crate::constants::{MAX_RACK_HEIGHT, MIN_RACK_HEIGHT, RACK_WIDTHS};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mounting plane a placed device is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    /// Front rails only
    #[default]
    Front,
    /// Rear rails only
    Rear,
    /// Both planes at once
    Both,
}

impl Face {
    /// Returns true if a device on this face is visible from `view`.
    #[must_use]
    pub const fn is_visible_from(self, view: RackView) -> bool {
        matches!(
            (self, view),
            (Self::Both, _) | (Self::Front, RackView::Front) | (Self::Rear, RackView::Rear)
        )
    }

    /// Views this face occupies.
    #[must_use]
    pub fn views(self) -> &'static [RackView] {
        match self {
            Self::Front => &[RackView::Front],
            Self::Rear => &[RackView::Rear],
            Self::Both => &[RackView::Front, RackView::Rear],
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Rear => f.write_str("rear"),
            Self::Both => f.write_str("both"),
        }
    }
}

/// Side of the rack being looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RackView {
    /// Looking at the front rails
    #[default]
    Front,
    /// Looking at the rear rails
    Rear,
}

impl RackView {
    /// The view from the other side of the rack.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Rear,
            Self::Rear => Self::Front,
        }
    }
}

impl fmt::Display for RackView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Rear => f.write_str("rear"),
        }
    }
}

/// Physical construction of the rack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormFactor {
    /// Two-post relay rack
    #[serde(rename = "2-post")]
    TwoPost,
    /// Four-post open rack
    #[default]
    #[serde(rename = "4-post")]
    FourPost,
    /// Enclosed four-post cabinet
    #[serde(rename = "4-post-cabinet")]
    FourPostCabinet,
    /// Wall-mounted rack
    WallMount,
    /// Open frame rack
    OpenFrame,
}

/// Inclusive range of rack units, `bottom <= top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct URange {
    /// Lowest unit number in the range
    pub bottom: u32,
    /// Highest unit number in the range
    pub top: u32,
}

impl URange {
    /// Range starting at `position` spanning `units` slots.
    ///
    /// The top saturates at `u32::MAX`; use [`URange::checked_from_position`]
    /// where a truncated range would be wrong.
    #[must_use]
    pub const fn from_position(position: u32, units: u32) -> Self {
        let units = if units == 0 { 1 } else { units };
        Self {
            bottom: position,
            top: position.saturating_add(units - 1),
        }
    }

    /// Like [`URange::from_position`], or `None` when the top unit would
    /// not fit in a `u32`.
    #[must_use]
    pub const fn checked_from_position(position: u32, units: u32) -> Option<Self> {
        let units = if units == 0 { 1 } else { units };
        match position.checked_add(units - 1) {
            Some(top) => Some(Self {
                bottom: position,
                top,
            }),
            None => None,
        }
    }

    /// Returns true if the two ranges share at least one unit.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.bottom <= other.top && other.bottom <= self.top
    }

    /// Returns true if `unit` falls inside the range.
    #[must_use]
    pub const fn contains(&self, unit: u32) -> bool {
        self.bottom <= unit && unit <= self.top
    }

    /// Returns true if `other` lies entirely inside this range.
    #[must_use]
    pub const fn encloses(&self, other: &Self) -> bool {
        self.bottom <= other.bottom && other.top <= self.top
    }
}

impl fmt::Display for URange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bottom == self.top {
            write!(f, "U{}", self.bottom)
        } else {
            write!(f, "U{}-U{}", self.bottom, self.top)
        }
    }
}

/// A device instance mounted in a rack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedDevice {
    /// Stable instance identifier (UUID)
    pub id: String,
    /// Slug of the `DeviceType` this instance uses
    pub device_type: String,
    /// Lowest rack unit occupied (absolute unit number)
    pub position: u32,
    /// Mounting plane
    #[serde(default)]
    pub face: Face,
    /// Optional per-instance label (e.g., hostname)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PlacedDevice {
    /// Creates a placement with a fresh identifier.
    pub fn new(device_type: impl Into<String>, position: u32, face: Face) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            device_type: device_type.into(),
            position,
            face,
            name: None,
        }
    }

    /// Sets the instance label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An equipment rack and the devices mounted in it.
///
/// # Validation
///
/// - height between 1 and 100 units
/// - width 10 or 19 inches
/// - starting_unit at least 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    /// Rack name
    #[serde(default)]
    pub name: String,
    /// Height in rack units
    pub height: u32,
    /// Rail width in inches (10 or 19)
    #[serde(default = "default_width")]
    pub width: u8,
    /// Units numbered top-down instead of bottom-up
    #[serde(default)]
    pub desc_units: bool,
    /// Number of the lowest unit
    #[serde(default = "default_starting_unit")]
    pub starting_unit: u32,
    /// Physical construction
    #[serde(default)]
    pub form_factor: FormFactor,
    /// Mounted devices
    #[serde(default)]
    pub devices: Vec<PlacedDevice>,
    /// Side currently shown by the editor; never written by exports
    #[serde(default, skip_serializing)]
    pub view: RackView,
}

const fn default_width() -> u8 {
    19
}

const fn default_starting_unit() -> u32 {
    1
}

impl Rack {
    /// Creates an empty 19" four-post rack with validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rackplan::models::Rack;
    ///
    /// let rack = Rack::new("Lab", 42).unwrap();
    /// assert_eq!(rack.unit_range().bottom, 1);
    /// assert_eq!(rack.unit_range().top, 42);
    /// assert!(Rack::new("Too tall", 101).is_err());
    /// ```
    pub fn new(name: impl Into<String>, height: u32) -> Result<Self> {
        Self::validate_height(height)?;
        Ok(Self {
            name: name.into(),
            height,
            width: default_width(),
            desc_units: false,
            starting_unit: default_starting_unit(),
            form_factor: FormFactor::default(),
            devices: Vec::new(),
            view: RackView::default(),
        })
    }

    fn validate_height(height: u32) -> Result<()> {
        if !(MIN_RACK_HEIGHT..=MAX_RACK_HEIGHT).contains(&height) {
            anyhow::bail!(
                "Rack height {height}U must be between {MIN_RACK_HEIGHT}U and {MAX_RACK_HEIGHT}U"
            );
        }
        Ok(())
    }

    /// Sets the rail width with validation.
    pub fn with_width(mut self, width: u8) -> Result<Self> {
        if !RACK_WIDTHS.contains(&width) {
            anyhow::bail!("Rack width {width}\" must be 10\" or 19\"");
        }
        self.width = width;
        Ok(self)
    }

    /// Range of unit numbers available in this rack.
    #[must_use]
    pub const fn unit_range(&self) -> URange {
        URange::from_position(self.starting_unit, self.height)
    }

    /// Finds a placed device by identifier.
    #[must_use]
    pub fn device(&self, id: &str) -> Option<&PlacedDevice> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Finds a placed device by identifier for mutation.
    pub fn device_mut(&mut self, id: &str) -> Option<&mut PlacedDevice> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    /// Index of a placed device in `devices`.
    #[must_use]
    pub fn device_index(&self, id: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.id == id)
    }
}
