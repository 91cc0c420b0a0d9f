//! Rack occupancy queries.
//!
//! Pure functions over a rack and its device-type catalogue: which units are
//! taken on each face, which units are blocked by full-depth gear mounted on
//! the other side, and where stacked devices blow hot air into each other.
//!
//! Placed devices whose type is missing from the catalogue are ignored here;
//! validation reports them as dangling references.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::{Airflow, DeviceType, Face, PlacedDevice, Rack, RackView, URange};

/// Device-type catalogue keyed by slug.
pub type DeviceTypeMap = BTreeMap<String, DeviceType>;

/// Units reserved by one placed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedRange {
    /// Placed device identifier
    pub device_id: String,
    /// Reserved units
    pub range: URange,
    /// Face the device is mounted on
    pub face: Face,
}

/// Two devices reserving the same units on a shared face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapConflict {
    /// First device identifier (lower index in the rack)
    pub first: String,
    /// Second device identifier
    pub second: String,
    /// Face where the overlap was found
    pub face: RackView,
    /// Units claimed by both devices
    pub range: URange,
}

/// How a device moves air on a given face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AirflowDirection {
    /// Cool air drawn in
    Intake,
    /// Hot air pushed out
    Exhaust,
    /// No front/rear airflow
    Neutral,
}

/// A device exhausting directly into the intake of the device above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirflowConflict {
    /// Position of the upper (intake) device
    pub position: u32,
    /// Lower device identifier (exhausting)
    pub lower: String,
    /// Upper device identifier (intaking)
    pub upper: String,
    /// Face where exhaust meets intake
    pub face: RackView,
}

/// Airflow direction of `airflow` as seen from `view`.
///
/// Side-to-rear intake is treated as front intake. Lateral airflow is neutral
/// on both faces.
#[must_use]
pub const fn airflow_direction(airflow: Airflow, view: RackView) -> AirflowDirection {
    match (airflow, view) {
        (Airflow::FrontToRear | Airflow::SideToRear, RackView::Front) => AirflowDirection::Intake,
        (Airflow::FrontToRear | Airflow::SideToRear, RackView::Rear) => AirflowDirection::Exhaust,
        (Airflow::RearToFront, RackView::Front) => AirflowDirection::Exhaust,
        (Airflow::RearToFront, RackView::Rear) => AirflowDirection::Intake,
        (Airflow::Passive | Airflow::LeftToRight | Airflow::RightToLeft, _) => {
            AirflowDirection::Neutral
        }
    }
}

/// Units reserved by `device`, if its type resolves.
#[must_use]
pub fn device_range(device: &PlacedDevice, device_types: &DeviceTypeMap) -> Option<URange> {
    device_types
        .get(&device.device_type)
        .map(|dt| URange::from_position(device.position, dt.occupied_units()))
}

/// Resolved devices visible from `view`, paired with their reserved range.
fn visible_devices<'a>(
    rack: &'a Rack,
    device_types: &'a DeviceTypeMap,
    view: RackView,
) -> impl Iterator<Item = (&'a PlacedDevice, &'a DeviceType, URange)> + 'a {
    rack.devices
        .iter()
        .filter(move |d| d.face.is_visible_from(view))
        .filter_map(move |d| {
            let dt = device_types.get(&d.device_type)?;
            Some((d, dt, URange::from_position(d.position, dt.occupied_units())))
        })
}

/// Ranges reserved on `view`, ordered by bottom unit.
///
/// # Examples
///
/// ```
/// use rackplan::models::{DeviceCategory, DeviceType, Face, PlacedDevice, Rack, RackView, URange};
/// use rackplan::services::occupancy::{occupied_ranges, DeviceTypeMap};
///
/// let mut types = DeviceTypeMap::new();
/// types.insert("nas".into(), DeviceType::new("nas", 2.0, DeviceCategory::Storage).unwrap());
///
/// let mut rack = Rack::new("Lab", 12).unwrap();
/// rack.devices.push(PlacedDevice::new("nas", 3, Face::Both));
///
/// let front = occupied_ranges(&rack, &types, RackView::Front);
/// assert_eq!(front[0].range, URange { bottom: 3, top: 4 });
/// assert_eq!(occupied_ranges(&rack, &types, RackView::Rear).len(), 1);
/// ```
#[must_use]
pub fn occupied_ranges(rack: &Rack, device_types: &DeviceTypeMap, view: RackView) -> Vec<OccupiedRange> {
    let mut ranges: Vec<OccupiedRange> = visible_devices(rack, device_types, view)
        .map(|(device, _, range)| OccupiedRange {
            device_id: device.id.clone(),
            range,
            face: device.face,
        })
        .collect();
    ranges.sort_by_key(|r| (r.range.bottom, r.range.top));
    ranges
}

/// Returns true if a device of `u_height` fits at `position` on `face`.
///
/// The candidate must lie inside the rack and must not intersect any range
/// on the faces it would occupy (`Face::Both` checks front and rear).
#[must_use]
pub fn is_position_available(
    rack: &Rack,
    device_types: &DeviceTypeMap,
    face: Face,
    position: u32,
    u_height: f64,
) -> bool {
    is_position_available_excluding(rack, device_types, face, position, u_height, None)
}

/// Like [`is_position_available`], ignoring the placed device `exclude`.
///
/// Used when moving a device so its current footprint does not block it.
#[must_use]
pub fn is_position_available_excluding(
    rack: &Rack,
    device_types: &DeviceTypeMap,
    face: Face,
    position: u32,
    u_height: f64,
    exclude: Option<&str>,
) -> bool {
    let Some(candidate) = URange::checked_from_position(position, units_for(u_height)) else {
        return false;
    };
    if !rack.unit_range().encloses(&candidate) {
        return false;
    }

    find_collisions_in_range(rack, device_types, face, candidate, exclude).is_empty()
}

/// Devices a candidate placement would collide with.
#[must_use]
pub fn find_collisions<'a>(
    rack: &'a Rack,
    device_types: &DeviceTypeMap,
    face: Face,
    position: u32,
    u_height: f64,
    exclude: Option<&str>,
) -> Vec<&'a PlacedDevice> {
    let candidate = URange::from_position(position, units_for(u_height));
    find_collisions_in_range(rack, device_types, face, candidate, exclude)
}

fn find_collisions_in_range<'a>(
    rack: &'a Rack,
    device_types: &DeviceTypeMap,
    face: Face,
    candidate: URange,
    exclude: Option<&str>,
) -> Vec<&'a PlacedDevice> {
    rack.devices
        .iter()
        .filter(|d| Some(d.id.as_str()) != exclude)
        .filter(|d| face.views().iter().any(|v| d.face.is_visible_from(*v)))
        .filter(|d| device_range(d, device_types).is_some_and(|r| r.overlaps(&candidate)))
        .collect()
}

/// Ranges on `view` blocked by devices mounted on the opposite face.
///
/// A device blocks when it is full depth or mounted on both faces. Half-depth
/// devices on the opposite face leave the units free.
///
/// # Examples
///
/// ```
/// use rackplan::models::{DeviceCategory, DeviceType, Face, PlacedDevice, Rack, RackView, URange};
/// use rackplan::services::occupancy::{blocked_ranges, DeviceTypeMap};
///
/// let mut types = DeviceTypeMap::new();
/// types.insert("ups".into(), DeviceType::new("ups", 2.0, DeviceCategory::Power).unwrap());
///
/// let mut rack = Rack::new("Lab", 12).unwrap();
/// rack.devices.push(PlacedDevice::new("ups", 5, Face::Rear));
///
/// assert_eq!(
///     blocked_ranges(&rack, &types, RackView::Front),
///     vec![URange { bottom: 5, top: 6 }]
/// );
/// ```
#[must_use]
pub fn blocked_ranges(rack: &Rack, device_types: &DeviceTypeMap, view: RackView) -> Vec<URange> {
    let mut ranges: Vec<URange> = visible_devices(rack, device_types, view.opposite())
        .filter(|(device, dt, _)| dt.is_full_depth || device.face == Face::Both)
        .map(|(_, _, range)| range)
        .collect();
    ranges.sort();
    ranges
}

/// Every pair of devices reserving the same units on a shared face.
///
/// A pair overlapping on both faces is reported once, for the front.
#[must_use]
pub fn find_overlaps(rack: &Rack, device_types: &DeviceTypeMap) -> Vec<OverlapConflict> {
    let mut conflicts = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for view in [RackView::Front, RackView::Rear] {
        let visible: Vec<(usize, URange)> = rack
            .devices
            .iter()
            .enumerate()
            .filter(|(_, d)| d.face.is_visible_from(view))
            .filter_map(|(idx, d)| device_range(d, device_types).map(|r| (idx, r)))
            .collect();

        for (i, (a_idx, a_range)) in visible.iter().enumerate() {
            for (b_idx, b_range) in &visible[i + 1..] {
                if !a_range.overlaps(b_range) || !seen.insert((*a_idx, *b_idx)) {
                    continue;
                }
                conflicts.push(OverlapConflict {
                    first: rack.devices[*a_idx].id.clone(),
                    second: rack.devices[*b_idx].id.clone(),
                    face: view,
                    range: URange {
                        bottom: a_range.bottom.max(b_range.bottom),
                        top: a_range.top.min(b_range.top),
                    },
                });
            }
        }
    }

    conflicts
}

/// Stacked devices where the lower one exhausts into the upper one's intake.
///
/// Only vertical adjacency is considered: the upper device must start at the
/// unit directly above the lower device's top unit, and both must be visible
/// on the face being checked.
///
/// # Examples
///
/// ```
/// use rackplan::models::{Airflow, DeviceCategory, DeviceType, Face, PlacedDevice, Rack, RackView};
/// use rackplan::services::occupancy::{find_airflow_conflicts, DeviceTypeMap};
///
/// let mut types = DeviceTypeMap::new();
/// types.insert(
///     "reverse".into(),
///     DeviceType::new("reverse", 1.0, DeviceCategory::Network).unwrap().with_airflow(Airflow::RearToFront),
/// );
/// types.insert(
///     "forward".into(),
///     DeviceType::new("forward", 1.0, DeviceCategory::Server).unwrap().with_airflow(Airflow::FrontToRear),
/// );
///
/// let mut rack = Rack::new("Lab", 12).unwrap();
/// rack.devices.push(PlacedDevice::new("reverse", 1, Face::Front));
/// rack.devices.push(PlacedDevice::new("forward", 2, Face::Front));
///
/// let conflicts = find_airflow_conflicts(&rack, &types);
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(conflicts[0].position, 2);
/// assert_eq!(conflicts[0].face, RackView::Front);
/// ```
#[must_use]
pub fn find_airflow_conflicts(rack: &Rack, device_types: &DeviceTypeMap) -> Vec<AirflowConflict> {
    let mut conflicts = Vec::new();

    for view in [RackView::Front, RackView::Rear] {
        let mut stacked: Vec<(&PlacedDevice, &DeviceType, URange)> =
            visible_devices(rack, device_types, view).collect();
        stacked.sort_by_key(|(_, _, range)| range.bottom);

        let mut by_bottom: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, (_, _, range)) in stacked.iter().enumerate() {
            by_bottom.entry(range.bottom).or_default().push(idx);
        }

        for (lower, lower_type, lower_range) in &stacked {
            if airflow_direction(lower_type.airflow, view) != AirflowDirection::Exhaust {
                continue;
            }
            let Some(above) = lower_range.top.checked_add(1).and_then(|u| by_bottom.get(&u)) else {
                continue;
            };
            for &idx in above {
                let (upper, upper_type, upper_range) = &stacked[idx];
                if airflow_direction(upper_type.airflow, view) == AirflowDirection::Intake {
                    conflicts.push(AirflowConflict {
                        position: upper_range.bottom,
                        lower: lower.id.clone(),
                        upper: upper.id.clone(),
                        face: view,
                    });
                }
            }
        }
    }

    conflicts
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn units_for(u_height: f64) -> u32 {
    (u_height.ceil() as u32).max(1)
}
