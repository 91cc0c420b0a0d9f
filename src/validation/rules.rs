//! Business rules for typed layouts.

use std::collections::HashSet;

use super::{ValidationError, ValidationErrorKind, ValidationReport, ValidationWarning};
use crate::models::{Layout, URange};
use crate::services::occupancy::{find_airflow_conflicts, find_overlaps};

/// Checks placement rules of a layout.
///
/// Errors:
/// - placed device references a slug missing from `device_types`
/// - two placed devices share an identifier
/// - placed device extends outside the rack's unit range
/// - two placed devices overlap on a shared face
///
/// Airflow conflicts are reported as warnings.
#[must_use]
pub fn validate_layout(layout: &Layout) -> ValidationReport {
    let mut report = ValidationReport::new();
    let rack = &layout.rack;
    let bounds = rack.unit_range();
    let mut ids = HashSet::new();

    for (idx, device) in rack.devices.iter().enumerate() {
        let path = format!("rack.devices[{idx}]");

        if !ids.insert(device.id.as_str()) {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Placed device id '{}' is used more than once", device.id),
                )
                .at(&path)
                .with_device(&device.id),
            );
        }

        let Some(device_type) = layout.device_type_of(device) else {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::DanglingReference,
                    format!(
                        "Device at U{} references unknown device type '{}'",
                        device.position, device.device_type
                    ),
                )
                .at(format!("{path}.device_type"))
                .with_device(&device.id),
            );
            continue;
        };

        let units = device_type.occupied_units();
        let range = URange::from_position(device.position, units);
        let fits = URange::checked_from_position(device.position, units)
            .is_some_and(|r| bounds.encloses(&r));
        if !fits {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::OutOfBounds,
                    format!(
                        "'{}' at {} extends outside rack units {}",
                        device_type.display_name(),
                        range,
                        bounds
                    ),
                )
                .at(format!("{path}.position"))
                .with_device(&device.id),
            );
        }
    }

    for overlap in find_overlaps(rack, &layout.device_types) {
        let label = |id: &str| {
            rack.device(id)
                .and_then(|d| layout.device_type_of(d))
                .map_or_else(|| id.to_string(), |dt| dt.display_name().to_string())
        };
        report.add_error(
            ValidationError::new(
                ValidationErrorKind::Overlap,
                format!(
                    "'{}' and '{}' both occupy {} on the {} face",
                    label(&overlap.first),
                    label(&overlap.second),
                    overlap.range,
                    overlap.face
                ),
            )
            .with_device(&overlap.second),
        );
    }

    for conflict in find_airflow_conflicts(rack, &layout.device_types) {
        report.add_warning(ValidationWarning::new(format!(
            "Airflow conflict at U{} on the {} face: device below exhausts into the intake above",
            conflict.position, conflict.face
        )));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Airflow, DeviceCategory, DeviceType, Face, PlacedDevice, Rack};

    fn layout() -> Layout {
        let mut layout = Layout::new("Test", Rack::new("Main", 10).unwrap());
        layout
            .add_device_type(DeviceType::new("server", 2.0, DeviceCategory::Server).unwrap())
            .unwrap();
        layout
            .add_device_type(
                DeviceType::new("switch", 1.0, DeviceCategory::Network)
                    .unwrap()
                    .with_airflow(Airflow::RearToFront),
            )
            .unwrap();
        layout
            .add_device_type(
                DeviceType::new("fwd", 1.0, DeviceCategory::Server)
                    .unwrap()
                    .with_airflow(Airflow::FrontToRear),
            )
            .unwrap();
        layout
    }

    fn place(layout: &mut Layout, slug: &str, position: u32, face: Face) {
        layout
            .rack
            .devices
            .push(PlacedDevice::new(slug, position, face));
    }

    #[test]
    fn test_valid_layout() {
        let mut layout = layout();
        place(&mut layout, "server", 1, Face::Front);
        place(&mut layout, "switch", 3, Face::Rear);
        let report = validate_layout(&layout);
        assert!(report.is_valid(), "{}", report.format_message());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_dangling_reference() {
        let mut layout = layout();
        place(&mut layout, "ghost", 1, Face::Front);
        let report = validate_layout(&layout);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ValidationErrorKind::DanglingReference);
        assert!(report.errors[0].message.contains("ghost"));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut layout = layout();
        place(&mut layout, "server", 10, Face::Front);
        let report = validate_layout(&layout);
        assert!(report.has_error(ValidationErrorKind::OutOfBounds));
        assert!(report.errors[0].message.contains("U10-U11"));
    }

    #[test]
    fn test_below_starting_unit() {
        let mut layout = layout();
        layout.rack.starting_unit = 3;
        place(&mut layout, "switch", 2, Face::Front);
        assert!(validate_layout(&layout).has_error(ValidationErrorKind::OutOfBounds));
    }

    #[test]
    fn test_range_past_u32_max_is_out_of_bounds() {
        let mut layout = layout();
        layout.rack.starting_unit = u32::MAX - 1;
        place(&mut layout, "switch", u32::MAX - 1, Face::Front);
        place(&mut layout, "server", u32::MAX, Face::Front);

        let report = validate_layout(&layout);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ValidationErrorKind::OutOfBounds);
        assert_eq!(report.errors[0].path.as_deref(), Some("rack.devices[1].position"));
    }

    #[test]
    fn test_overlap() {
        let mut layout = layout();
        place(&mut layout, "server", 1, Face::Front);
        place(&mut layout, "switch", 2, Face::Both);
        let report = validate_layout(&layout);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ValidationErrorKind::Overlap);
        assert!(report.errors[0].message.contains("U2"));
    }

    #[test]
    fn test_duplicate_id() {
        let mut layout = layout();
        place(&mut layout, "switch", 1, Face::Front);
        let mut copy = layout.rack.devices[0].clone();
        copy.position = 5;
        layout.rack.devices.push(copy);
        assert!(validate_layout(&layout).has_error(ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_airflow_conflict_is_warning() {
        let mut layout = layout();
        place(&mut layout, "switch", 1, Face::Front);
        place(&mut layout, "fwd", 2, Face::Front);
        let report = validate_layout(&layout);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("U2"));
    }
}
