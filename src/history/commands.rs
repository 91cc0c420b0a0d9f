//! Reversible layout mutations.
//!
//! A [`Command`] captures, at construction time, every piece of state needed
//! to apply and revert itself. Constructors that relocate devices consult the
//! occupancy engine and refuse placements that would collide or leave the rack.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::{DeviceType, Face, Layout, PlacedDevice, Rack};
use crate::services::occupancy::is_position_available_excluding;

/// Kind tag of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Define a new device type
    AddDeviceType,
    /// Change an existing device type
    UpdateDeviceType,
    /// Remove a device type and its placements
    DeleteDeviceType,
    /// Mount a device
    PlaceDevice,
    /// Change a device's position
    MoveDevice,
    /// Unmount a device
    RemoveDevice,
    /// Change a device's mounting face
    UpdateFace,
    /// Unmount every device
    ClearRack,
    /// Swap the whole rack
    ReplaceRack,
    /// Change the layout name
    RenameLayout,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AddDeviceType => "add device type",
            Self::UpdateDeviceType => "update device type",
            Self::DeleteDeviceType => "delete device type",
            Self::PlaceDevice => "place device",
            Self::MoveDevice => "move device",
            Self::RemoveDevice => "remove device",
            Self::UpdateFace => "update face",
            Self::ClearRack => "clear rack",
            Self::ReplaceRack => "replace rack",
            Self::RenameLayout => "rename layout",
        };
        f.write_str(label)
    }
}

/// Captured state of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandAction {
    /// Insert `device_type`
    AddDeviceType {
        /// Type to insert
        device_type: DeviceType,
    },
    /// Replace `before` with `after` under the same slug
    UpdateDeviceType {
        /// Definition prior to the edit
        before: DeviceType,
        /// Definition after the edit
        after: DeviceType,
    },
    /// Remove a type together with its placements
    DeleteDeviceType {
        /// Removed definition
        device_type: DeviceType,
        /// Removed placements with their indices in the rack
        placements: Vec<(usize, PlacedDevice)>,
    },
    /// Append `device` to the rack
    PlaceDevice {
        /// New placement
        device: PlacedDevice,
    },
    /// Move device `id` from `from` to `to`
    MoveDevice {
        /// Placed device identifier
        id: String,
        /// Position prior to the move
        from: u32,
        /// Position after the move
        to: u32,
    },
    /// Remove `device` from index `index`
    RemoveDevice {
        /// Index in the rack prior to removal
        index: usize,
        /// Removed placement
        device: PlacedDevice,
    },
    /// Change the face of device `id`
    UpdateFace {
        /// Placed device identifier
        id: String,
        /// Face prior to the change
        from: Face,
        /// Face after the change
        to: Face,
    },
    /// Remove every placement
    ClearRack {
        /// Placements prior to clearing, in order
        devices: Vec<PlacedDevice>,
    },
    /// Swap the rack
    ReplaceRack {
        /// Rack prior to the swap
        before: Box<Rack>,
        /// Rack after the swap
        after: Box<Rack>,
    },
    /// Rename the layout
    RenameLayout {
        /// Name prior to the change
        from: String,
        /// Name after the change
        to: String,
    },
}

/// A reversible, self-describing layout mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Human-readable description (e.g., for an "Undo ..." menu entry)
    pub description: String,
    /// When the command was created
    pub timestamp: DateTime<Utc>,
    /// Captured state
    pub action: CommandAction,
}

impl Command {
    fn new(description: impl Into<String>, action: CommandAction) -> Self {
        Self {
            description: description.into(),
            timestamp: Utc::now(),
            action,
        }
    }

    /// Overrides the creation time.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Defines a new device type.
    pub fn add_device_type(layout: &Layout, device_type: DeviceType) -> Result<Self> {
        if layout.device_types.contains_key(&device_type.slug) {
            anyhow::bail!("Device type '{}' already exists", device_type.slug);
        }
        Ok(Self::new(
            format!("Add {}", device_type.display_name()),
            CommandAction::AddDeviceType { device_type },
        ))
    }

    /// Replaces the definition stored under `after.slug`.
    pub fn update_device_type(layout: &Layout, after: DeviceType) -> Result<Self> {
        let before = layout
            .device_type(&after.slug)
            .cloned()
            .with_context(|| format!("Device type '{}' not found", after.slug))?;
        Ok(Self::new(
            format!("Update {}", after.display_name()),
            CommandAction::UpdateDeviceType { before, after },
        ))
    }

    /// Deletes a device type along with every device using it.
    pub fn delete_device_type(layout: &Layout, slug: &str) -> Result<Self> {
        let device_type = layout
            .device_type(slug)
            .cloned()
            .with_context(|| format!("Device type '{slug}' not found"))?;
        let placements = layout
            .rack
            .devices
            .iter()
            .enumerate()
            .filter(|(_, d)| d.device_type == slug)
            .map(|(idx, d)| (idx, d.clone()))
            .collect();
        Ok(Self::new(
            format!("Delete {}", device_type.display_name()),
            CommandAction::DeleteDeviceType {
                device_type,
                placements,
            },
        ))
    }

    /// Mounts `device`, provided its type exists and the slot is free.
    pub fn place_device(layout: &Layout, device: PlacedDevice) -> Result<Self> {
        let device_type = layout
            .device_type_of(&device)
            .with_context(|| format!("Device type '{}' not found", device.device_type))?;
        if !is_position_available_excluding(
            &layout.rack,
            &layout.device_types,
            device.face,
            device.position,
            device_type.u_height,
            None,
        ) {
            anyhow::bail!(
                "Cannot place '{}' at U{}: slot is occupied or outside the rack",
                device_type.display_name(),
                device.position
            );
        }
        Ok(Self::new(
            format!("Place {}", device_type.display_name()),
            CommandAction::PlaceDevice { device },
        ))
    }

    /// Moves device `id` to `position`, ignoring its own footprint.
    pub fn move_device(layout: &Layout, id: &str, position: u32) -> Result<Self> {
        let device = layout
            .rack
            .device(id)
            .with_context(|| format!("Placed device '{id}' not found"))?;
        let device_type = layout
            .device_type_of(device)
            .with_context(|| format!("Device type '{}' not found", device.device_type))?;
        if !is_position_available_excluding(
            &layout.rack,
            &layout.device_types,
            device.face,
            position,
            device_type.u_height,
            Some(id),
        ) {
            anyhow::bail!(
                "Cannot move '{}' to U{position}: slot is occupied or outside the rack",
                device_type.display_name()
            );
        }
        Ok(Self::new(
            format!("Move {}", device_type.display_name()),
            CommandAction::MoveDevice {
                id: id.to_string(),
                from: device.position,
                to: position,
            },
        ))
    }

    /// Unmounts device `id`.
    pub fn remove_device(layout: &Layout, id: &str) -> Result<Self> {
        let index = layout
            .rack
            .device_index(id)
            .with_context(|| format!("Placed device '{id}' not found"))?;
        let device = layout.rack.devices[index].clone();
        let label = layout
            .device_type_of(&device)
            .map_or_else(|| device.device_type.clone(), |dt| dt.display_name().to_string());
        Ok(Self::new(
            format!("Remove {label}"),
            CommandAction::RemoveDevice { index, device },
        ))
    }

    /// Changes the mounting face of device `id`, provided the new face is free.
    pub fn update_face(layout: &Layout, id: &str, face: Face) -> Result<Self> {
        let device = layout
            .rack
            .device(id)
            .with_context(|| format!("Placed device '{id}' not found"))?;
        let device_type = layout
            .device_type_of(device)
            .with_context(|| format!("Device type '{}' not found", device.device_type))?;
        if !is_position_available_excluding(
            &layout.rack,
            &layout.device_types,
            face,
            device.position,
            device_type.u_height,
            Some(id),
        ) {
            anyhow::bail!(
                "Cannot mount '{}' on the {face} face: slot is occupied",
                device_type.display_name()
            );
        }
        Ok(Self::new(
            format!("Set {} face to {face}", device_type.display_name()),
            CommandAction::UpdateFace {
                id: id.to_string(),
                from: device.face,
                to: face,
            },
        ))
    }

    /// Unmounts every device in one step.
    #[must_use]
    pub fn clear_rack(layout: &Layout) -> Self {
        Self::new(
            "Clear rack",
            CommandAction::ClearRack {
                devices: layout.rack.devices.clone(),
            },
        )
    }

    /// Replaces the rack with `rack`.
    #[must_use]
    pub fn replace_rack(layout: &Layout, rack: Rack) -> Self {
        Self::new(
            format!("Replace rack with '{}'", rack.name),
            CommandAction::ReplaceRack {
                before: Box::new(layout.rack.clone()),
                after: Box::new(rack),
            },
        )
    }

    /// Renames the layout.
    pub fn rename_layout(layout: &Layout, name: impl Into<String>) -> Self {
        let to = name.into();
        Self::new(
            format!("Rename layout to '{to}'"),
            CommandAction::RenameLayout {
                from: layout.name.clone(),
                to,
            },
        )
    }

    /// Kind tag of this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match &self.action {
            CommandAction::AddDeviceType { .. } => CommandKind::AddDeviceType,
            CommandAction::UpdateDeviceType { .. } => CommandKind::UpdateDeviceType,
            CommandAction::DeleteDeviceType { .. } => CommandKind::DeleteDeviceType,
            CommandAction::PlaceDevice { .. } => CommandKind::PlaceDevice,
            CommandAction::MoveDevice { .. } => CommandKind::MoveDevice,
            CommandAction::RemoveDevice { .. } => CommandKind::RemoveDevice,
            CommandAction::UpdateFace { .. } => CommandKind::UpdateFace,
            CommandAction::ClearRack { .. } => CommandKind::ClearRack,
            CommandAction::ReplaceRack { .. } => CommandKind::ReplaceRack,
            CommandAction::RenameLayout { .. } => CommandKind::RenameLayout,
        }
    }

    /// Applies the command. Returns false, leaving `layout` untouched, if
    /// the target no longer exists.
    pub fn execute(&self, layout: &mut Layout) -> bool {
        match &self.action {
            CommandAction::AddDeviceType { device_type } => {
                if layout.device_types.contains_key(&device_type.slug) {
                    return false;
                }
                layout
                    .device_types
                    .insert(device_type.slug.clone(), device_type.clone());
                true
            }
            CommandAction::UpdateDeviceType { before, after } => {
                replace_device_type(layout, &before.slug, after)
            }
            CommandAction::DeleteDeviceType { device_type, .. } => {
                if layout.device_types.remove(&device_type.slug).is_none() {
                    return false;
                }
                layout
                    .rack
                    .devices
                    .retain(|d| d.device_type != device_type.slug);
                true
            }
            CommandAction::PlaceDevice { device } => {
                if layout.rack.device(&device.id).is_some() {
                    return false;
                }
                layout.rack.devices.push(device.clone());
                true
            }
            CommandAction::MoveDevice { id, to, .. } => set_position(layout, id, *to),
            CommandAction::RemoveDevice { device, .. } => {
                remove_by_id(layout, &device.id).is_some()
            }
            CommandAction::UpdateFace { id, to, .. } => set_face(layout, id, *to),
            CommandAction::ClearRack { .. } => {
                layout.rack.devices.clear();
                true
            }
            CommandAction::ReplaceRack { after, .. } => {
                layout.rack = after.as_ref().clone();
                true
            }
            CommandAction::RenameLayout { to, .. } => {
                layout.name.clone_from(to);
                true
            }
        }
    }

    /// Reverts the command. Returns false, leaving `layout` untouched, if
    /// the target no longer exists.
    pub fn undo(&self, layout: &mut Layout) -> bool {
        match &self.action {
            CommandAction::AddDeviceType { device_type } => {
                layout.device_types.remove(&device_type.slug).is_some()
            }
            CommandAction::UpdateDeviceType { before, .. } => {
                replace_device_type(layout, &before.slug, before)
            }
            CommandAction::DeleteDeviceType {
                device_type,
                placements,
            } => {
                if layout.device_types.contains_key(&device_type.slug) {
                    return false;
                }
                layout
                    .device_types
                    .insert(device_type.slug.clone(), device_type.clone());
                for (index, device) in placements {
                    let index = (*index).min(layout.rack.devices.len());
                    layout.rack.devices.insert(index, device.clone());
                }
                true
            }
            CommandAction::PlaceDevice { device } => remove_by_id(layout, &device.id).is_some(),
            CommandAction::MoveDevice { id, from, .. } => set_position(layout, id, *from),
            CommandAction::RemoveDevice { index, device } => {
                if layout.rack.device(&device.id).is_some() {
                    return false;
                }
                let index = (*index).min(layout.rack.devices.len());
                layout.rack.devices.insert(index, device.clone());
                true
            }
            CommandAction::UpdateFace { id, from, .. } => set_face(layout, id, *from),
            CommandAction::ClearRack { devices } => {
                layout.rack.devices.clone_from(devices);
                true
            }
            CommandAction::ReplaceRack { before, .. } => {
                layout.rack = before.as_ref().clone();
                true
            }
            CommandAction::RenameLayout { from, .. } => {
                layout.name.clone_from(from);
                true
            }
        }
    }

    /// Merges `next` into this command if both edit the same target.
    ///
    /// The merged command keeps this command's pre-state and takes the
    /// post-state, description and timestamp of `next`.
    pub fn coalesce(&mut self, next: &Self) -> bool {
        let merged = match (&mut self.action, &next.action) {
            (
                CommandAction::MoveDevice { id, to, .. },
                CommandAction::MoveDevice {
                    id: next_id,
                    to: next_to,
                    ..
                },
            ) if id == next_id => {
                *to = *next_to;
                true
            }
            (
                CommandAction::UpdateDeviceType { before, after },
                CommandAction::UpdateDeviceType {
                    before: next_before,
                    after: next_after,
                },
            ) if before.slug == next_before.slug => {
                after.clone_from(next_after);
                true
            }
            (CommandAction::RenameLayout { to, .. }, CommandAction::RenameLayout { to: next_to, .. }) => {
                to.clone_from(next_to);
                true
            }
            _ => false,
        };

        if merged {
            self.description.clone_from(&next.description);
            self.timestamp = next.timestamp;
        }
        merged
    }
}

fn replace_device_type(layout: &mut Layout, slug: &str, definition: &DeviceType) -> bool {
    match layout.device_types.get_mut(slug) {
        Some(existing) => {
            *existing = definition.clone();
            existing.slug = slug.to_string();
            true
        }
        None => false,
    }
}

fn set_position(layout: &mut Layout, id: &str, position: u32) -> bool {
    match layout.rack.device_mut(id) {
        Some(device) => {
            device.position = position;
            true
        }
        None => false,
    }
}

fn set_face(layout: &mut Layout, id: &str, face: Face) -> bool {
    match layout.rack.device_mut(id) {
        Some(device) => {
            device.face = face;
            true
        }
        None => false,
    }
}

fn remove_by_id(layout: &mut Layout, id: &str) -> Option<PlacedDevice> {
    let index = layout.rack.device_index(id)?;
    Some(layout.rack.devices.remove(index))
}
