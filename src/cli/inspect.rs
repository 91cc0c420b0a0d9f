//! Inspect command: rack occupancy as seen from one side.

use crate::cli::common::{load_config, load_layout, print_json, CliError, CliResult};
use crate::models::{Layout, RackView, URange};
use crate::services::occupancy::{blocked_ranges, find_airflow_conflicts, occupied_ranges};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Rack side selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    /// Front rails
    Front,
    /// Rear rails
    Rear,
}

impl From<ViewArg> for RackView {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Front => Self::Front,
            ViewArg::Rear => Self::Rear,
        }
    }
}

/// Show rack occupancy, blocked units and airflow conflicts
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Path to layout JSON file
    #[arg(short, long, value_name = "FILE")]
    pub layout: PathBuf,

    /// Rack side to inspect (defaults to ui.default_view from config)
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DeviceSlot {
    id: String,
    device_type: String,
    label: String,
    range: URange,
    face: String,
}

#[derive(Debug, Serialize)]
struct AirflowItem {
    position: u32,
    lower: String,
    upper: String,
    face: RackView,
}

#[derive(Debug, Serialize)]
struct InspectResponse {
    name: String,
    rack: String,
    view: RackView,
    units: URange,
    device_types: usize,
    devices: Vec<DeviceSlot>,
    blocked: Vec<URange>,
    free_units: usize,
    airflow_conflicts: Vec<AirflowItem>,
}

fn build_response(layout: &Layout, view: RackView) -> InspectResponse {
    let rack = &layout.rack;
    let occupied = occupied_ranges(rack, &layout.device_types, view);
    let blocked = blocked_ranges(rack, &layout.device_types, view);

    let bounds = rack.unit_range();
    let taken: BTreeSet<u32> = occupied
        .iter()
        .map(|o| o.range)
        .chain(blocked.iter().copied())
        .flat_map(|r| r.bottom..=r.top)
        .filter(|u| bounds.contains(*u))
        .collect();
    let free_units = (bounds.bottom..=bounds.top).count() - taken.len();

    let devices = occupied
        .iter()
        .filter_map(|o| {
            let device = rack.device(&o.device_id)?;
            let label = device.name.clone().unwrap_or_else(|| {
                layout
                    .device_type_of(device)
                    .map_or_else(|| device.device_type.clone(), |dt| dt.display_name().to_string())
            });
            Some(DeviceSlot {
                id: device.id.clone(),
                device_type: device.device_type.clone(),
                label,
                range: o.range,
                face: o.face.to_string(),
            })
        })
        .collect();

    let airflow_conflicts = find_airflow_conflicts(rack, &layout.device_types)
        .into_iter()
        .filter(|c| c.face == view)
        .map(|c| AirflowItem {
            position: c.position,
            lower: c.lower,
            upper: c.upper,
            face: c.face,
        })
        .collect();

    InspectResponse {
        name: layout.name.clone(),
        rack: rack.name.clone(),
        view,
        units: bounds,
        device_types: layout.device_types.len(),
        devices,
        blocked,
        free_units,
        airflow_conflicts,
    }
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> CliResult<()> {
        let parsed = load_layout(&self.layout)?;
        let Some(layout) = parsed.layout else {
            eprintln!("{}", parsed.report.format_message());
            return Err(CliError::validation("Layout could not be read"));
        };

        let view = self
            .view
            .map_or_else(|| load_config().ui.default_view, RackView::from);
        let response = build_response(&layout, view);

        if self.json {
            return print_json(&response);
        }

        println!("{} / {} ({} view)", response.name, response.rack, response.view);
        println!(
            "Units {}, {} free, {} device types",
            response.units, response.free_units, response.device_types
        );

        println!("\nDevices ({}):", response.devices.len());
        for device in &response.devices {
            println!("  {:<10} {:<30} {}", device.range.to_string(), device.label, device.face);
        }

        if !response.blocked.is_empty() {
            println!("\nBlocked from the {} side:", response.view.opposite());
            for range in &response.blocked {
                println!("  {range}");
            }
        }

        if !response.airflow_conflicts.is_empty() {
            println!("\nAirflow conflicts:");
            for conflict in &response.airflow_conflicts {
                println!("  ⚠ U{} exhaust below feeds intake above", conflict.position);
            }
        }

        if !parsed.report.is_valid() {
            println!("\n{}", parsed.report.format_message());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeviceCategory, DeviceType, Face, PlacedDevice, Rack};

    #[test]
    fn test_build_response_counts_free_units() {
        let mut layout = Layout::new("Lab", Rack::new("Main", 10).unwrap());
        layout
            .add_device_type(DeviceType::new("server", 2.0, DeviceCategory::Server).unwrap())
            .unwrap();
        layout
            .add_device_type(
                DeviceType::new("patch", 1.0, DeviceCategory::PatchPanel)
                    .unwrap()
                    .half_depth(),
            )
            .unwrap();
        layout
            .rack
            .devices
            .push(PlacedDevice::new("server", 1, Face::Front).with_name("db-01"));
        layout
            .rack
            .devices
            .push(PlacedDevice::new("server", 5, Face::Rear));
        layout
            .rack
            .devices
            .push(PlacedDevice::new("patch", 9, Face::Rear));

        let response = build_response(&layout, RackView::Front);

        assert_eq!(response.devices.len(), 1);
        assert_eq!(response.devices[0].label, "db-01");
        assert_eq!(response.blocked, vec![URange { bottom: 5, top: 6 }]);
        assert_eq!(response.free_units, 6);
    }
}
