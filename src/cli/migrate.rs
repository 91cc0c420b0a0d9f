//! Schema migration command.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::migration::migrate;
use crate::services::layouts::write_atomic;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Upgrade a layout file to the current schema version
#[derive(Debug, Clone, Args)]
pub struct MigrateArgs {
    /// Layout file to migrate
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the migrated layout (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output a migration summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct MigrateResponse {
    source_version: String,
    target_version: String,
    migrated: bool,
    id_map: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<serde_json::Value>,
}

impl MigrateArgs {
    /// Execute the migrate command
    pub fn execute(&self) -> CliResult<()> {
        let content = fs::read_to_string(&self.input).map_err(|e| {
            CliError::io(format!("Failed to read {}: {e}", self.input.display()))
        })?;
        let raw: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| CliError::io(format!("Failed to parse layout JSON: {e}")))?;

        let migration = migrate(&raw);
        let pretty = serde_json::to_string_pretty(&migration.data)
            .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;

        if let Some(output) = &self.output {
            write_atomic(output, &pretty)
                .map_err(|e| CliError::io(format!("Failed to write migrated layout: {e:#}")))?;
        }

        let target_version = migration
            .data
            .get("version")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(CURRENT_SCHEMA_VERSION)
            .to_string();

        if self.json {
            let response = MigrateResponse {
                source_version: migration.from.to_string(),
                target_version,
                migrated: migration.upgraded(),
                id_map: migration.id_map.clone(),
                output: self.output.as_ref().map(|p| p.display().to_string()),
                layout: self.output.is_none().then(|| migration.data.clone()),
            };
            print_json(&response)?;
        } else if let Some(output) = &self.output {
            if migration.upgraded() {
                println!(
                    "✓ Migrated {} from {} to {target_version}",
                    self.input.display(),
                    migration.from
                );
            } else {
                println!("✓ {} is already at schema {}", self.input.display(), migration.from);
            }
            if !migration.id_map.is_empty() {
                println!("\nLibrary ids remapped ({}):", migration.id_map.len());
                for (old, slug) in &migration.id_map {
                    println!("  {old:<30} → {slug}");
                }
            }
            println!("\nWritten to {}", output.display());
        } else {
            println!("{pretty}");
        }

        Ok(())
    }
}
