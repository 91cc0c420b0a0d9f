//! Device library import command.

use crate::cli::common::{load_config, load_layout, print_json, CliError, CliResult};
use crate::history::{Command, History};
use crate::services::{import_device_library, LayoutService};
use clap::Args;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Import device types from a library file
#[derive(Debug, Clone, Args)]
pub struct ImportLibraryArgs {
    /// Device library JSON file ({ "devices": [...] })
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// Layout to add the imported device types to (saved in place)
    #[arg(short, long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ImportedItem {
    slug: String,
    name: String,
    category: String,
    u_height: f64,
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    imported: Vec<ImportedItem>,
    skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<String>,
}

impl ImportLibraryArgs {
    /// Execute the import-library command
    pub fn execute(&self) -> CliResult<()> {
        let content = fs::read_to_string(&self.file).map_err(|e| {
            CliError::io(format!("Failed to read {}: {e}", self.file.display()))
        })?;

        let target = match &self.layout {
            Some(path) => {
                let parsed = load_layout(path)?;
                let layout = parsed.layout.ok_or_else(|| {
                    CliError::validation(format!(
                        "Layout could not be read:\n{}",
                        parsed.report.format_message()
                    ))
                })?;
                Some((path, layout))
            }
            None => None,
        };

        let (names, slugs) = target.as_ref().map_or_else(
            || (HashSet::new(), HashSet::new()),
            |(_, layout)| (layout.display_names(), layout.slugs()),
        );
        let import = import_device_library(&content, &names, &slugs)
            .map_err(|e| CliError::io(format!("Failed to import device library: {e:#}")))?;

        if let Some((path, mut layout)) = target {
            let mut history = History::from_config(&load_config().editor);
            for device_type in &import.devices {
                let command = Command::add_device_type(&layout, device_type.clone())
                    .map_err(|e| CliError::validation(e.to_string()))?;
                history.execute(&mut layout, command);
            }
            LayoutService::save(&layout, path)
                .map_err(|e| CliError::io(format!("Failed to save layout: {e:#}")))?;
        }

        let response = ImportResponse {
            imported: import
                .devices
                .iter()
                .map(|d| ImportedItem {
                    slug: d.slug.clone(),
                    name: d.display_name().to_string(),
                    category: d.category.to_string(),
                    u_height: d.u_height,
                })
                .collect(),
            skipped: import.skipped,
            layout: self.layout.as_ref().map(|p| p.display().to_string()),
        };

        if self.json {
            return print_json(&response);
        }

        println!(
            "✓ Imported {} device types ({} skipped)",
            response.imported.len(),
            response.skipped
        );
        for item in &response.imported {
            println!(
                "  {:<30} {:<30} {:<16} {}U",
                item.slug, item.name, item.category, item.u_height
            );
        }
        if let Some(path) = &response.layout {
            println!("\nAdded to {path}");
        }

        Ok(())
    }
}
