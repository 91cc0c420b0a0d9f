//! Validation command for layout files.

use crate::cli::common::{load_layout, print_json, CliError, CliResult, ValidationMessage};
use crate::validation::ValidationErrorKind;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Validate a layout file for errors and warnings
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to layout JSON file
    #[arg(short, long, value_name = "FILE")]
    pub layout: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

/// Per-area check status ("passed", "failed" or "warning").
#[derive(Debug, Serialize)]
struct ValidationChecks {
    structure: &'static str,
    references: &'static str,
    placement: &'static str,
    airflow: &'static str,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    valid: bool,
    source_version: String,
    migrated: bool,
    errors: Vec<ValidationMessage>,
    checks: ValidationChecks,
}

const fn status(failed: bool) -> &'static str {
    if failed {
        "failed"
    } else {
        "passed"
    }
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let parsed = load_layout(&self.layout)?;
        let report = &parsed.report;

        let structure_failed = report.errors.iter().any(|e| {
            matches!(
                e.kind,
                ValidationErrorKind::MissingField
                    | ValidationErrorKind::WrongType
                    | ValidationErrorKind::InvalidValue
                    | ValidationErrorKind::InvalidSlug
                    | ValidationErrorKind::InvalidColour
            )
        });
        let checks = ValidationChecks {
            structure: status(structure_failed || parsed.layout.is_none()),
            references: status(report.has_error(ValidationErrorKind::DanglingReference)),
            placement: status(
                report.has_error(ValidationErrorKind::Overlap)
                    || report.has_error(ValidationErrorKind::OutOfBounds)
                    || report.has_error(ValidationErrorKind::DuplicateId),
            ),
            airflow: if report.warnings.is_empty() {
                "passed"
            } else {
                "warning"
            },
        };

        let response = ValidationResponse {
            valid: parsed.is_valid(),
            source_version: parsed.migration.from.to_string(),
            migrated: parsed.migration.upgraded(),
            errors: ValidationMessage::from_report(report),
            checks,
        };

        if self.json {
            print_json(&response)?;
        } else {
            if response.valid {
                println!("✓ Validation passed");
            } else {
                println!("✗ Validation failed");
            }
            if response.migrated {
                println!("  (migrated from schema {})", response.source_version);
            }

            println!("\nChecks:");
            println!("  Structure:  {}", response.checks.structure);
            println!("  References: {}", response.checks.references);
            println!("  Placement:  {}", response.checks.placement);
            println!("  Airflow:    {}", response.checks.airflow);

            if !response.errors.is_empty() {
                println!("\nIssues:");
                for msg in &response.errors {
                    let prefix = if msg.severity == "error" { "  ✗" } else { "  ⚠" };
                    match &msg.path {
                        Some(path) => println!("{prefix} [{path}] {}", msg.message),
                        None => println!("{prefix} {}", msg.message),
                    }
                }
            }
        }

        if !response.valid {
            return Err(CliError::validation("Validation failed"));
        }

        if self.strict && !report.warnings.is_empty() {
            return Err(CliError::validation("Warnings found in strict mode"));
        }

        Ok(())
    }
}
