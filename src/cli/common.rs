//! Shared CLI plumbing: error type, exit codes and output helpers.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::services::{LayoutService, ParsedLayout};

/// Process exit codes used by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Input was read but failed validation
    ValidationFailed = 1,
    /// File, parse or serialization failure
    IoError = 2,
}

impl ExitCode {
    /// Numeric process exit status.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by a CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code to terminate with
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Validation failure (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::ValidationFailed,
            message: message.into(),
        }
    }

    /// I/O or parse failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type of CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Loads, migrates and validates a layout file.
pub fn load_layout(path: &Path) -> CliResult<ParsedLayout> {
    LayoutService::load(path).map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))
}

/// Loads the application config, falling back to defaults when unreadable.
#[must_use]
pub fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {e:#}");
        Config::default()
    })
}

/// One finding in a JSON validation response.
#[derive(Debug, Serialize)]
pub struct ValidationMessage {
    /// "error" or "warning"
    pub severity: String,
    /// Error kind (absent for warnings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Human-readable message
    pub message: String,
    /// JSON path of the offending value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Placed device involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl ValidationMessage {
    /// Converts a validation report into ordered messages, errors first.
    #[must_use]
    pub fn from_report(report: &crate::validation::ValidationReport) -> Vec<Self> {
        let errors = report.errors.iter().map(|e| Self {
            severity: "error".to_string(),
            kind: serde_json::to_value(e.kind)
                .ok()
                .and_then(|v| v.as_str().map(String::from)),
            message: e.message.clone(),
            path: e.path.clone(),
            device_id: e.device_id.clone(),
        });
        let warnings = report.warnings.iter().map(|w| Self {
            severity: "warning".to_string(),
            kind: None,
            message: w.message.clone(),
            path: None,
            device_id: None,
        });
        errors.chain(warnings).collect()
    }
}
