//! Starter library listing command.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::models::{DeviceCategory, DeviceType};
use crate::starter_library::starter_library;
use clap::Args;
use serde::Serialize;

/// List the built-in starter device types
#[derive(Debug, Clone, Args)]
pub struct LibraryArgs {
    /// Only show one category (e.g., "server", "patch-panel")
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct LibraryResponse<'a> {
    version: &'a str,
    devices: Vec<&'a DeviceType>,
    count: usize,
}

impl LibraryArgs {
    /// Execute the library command
    pub fn execute(&self) -> CliResult<()> {
        let category = match &self.category {
            Some(value) => Some(DeviceCategory::parse(value).ok_or_else(|| {
                let known: Vec<_> = DeviceCategory::ALL.iter().map(|c| c.as_str()).collect();
                CliError::validation(format!(
                    "Unknown category '{value}'. Known categories: {}",
                    known.join(", ")
                ))
            })?),
            None => None,
        };

        let library = starter_library();
        let devices: Vec<&DeviceType> = match category {
            Some(category) => library.by_category(category).collect(),
            None => library.devices().iter().collect(),
        };

        let response = LibraryResponse {
            version: library.version(),
            count: devices.len(),
            devices,
        };

        if self.json {
            return print_json(&response);
        }

        if response.count == 0 {
            println!("No starter devices in this category.");
            return Ok(());
        }

        println!("Starter devices ({}):", response.count);
        println!();
        for device in &response.devices {
            let depth = if device.is_full_depth { "full" } else { "half" };
            println!(
                "  {:<24} {:<24} {:<18} {:>4}U  {depth}",
                device.slug,
                device.display_name(),
                device.category.as_str(),
                device.u_height
            );
        }

        Ok(())
    }
}
