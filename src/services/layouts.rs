//! Layout parsing, export and file I/O.
//!
//! Every layout read from outside (file, session, clipboard) goes through
//! [`parse_layout`]: JSON parse, schema migration, structural validation,
//! typed deserialization and business-rule validation, in that order.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::constants::CURRENT_SCHEMA_VERSION;
use crate::migration::{migrate, Migration};
use crate::models::Layout;
use crate::validation::{
    validate_layout, validate_structure, ValidationError, ValidationErrorKind, ValidationReport,
};

/// A layout read from serialized form, with everything found on the way.
#[derive(Debug, Clone)]
pub struct ParsedLayout {
    /// Typed layout; present whenever the document deserializes, even if
    /// business rules are violated
    pub layout: Option<Layout>,
    /// Structural and business-rule findings
    pub report: ValidationReport,
    /// Migration applied before validation
    pub migration: Migration,
}

impl ParsedLayout {
    /// Returns true if a typed layout was produced and no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.layout.is_some() && self.report.is_valid()
    }
}

/// Parses, migrates and validates a serialized layout.
///
/// # Errors
///
/// Returns an error only if `json` is not valid JSON. Every other problem is
/// reported in [`ParsedLayout::report`].
pub fn parse_layout(json: &str) -> Result<ParsedLayout> {
    let raw: Value = serde_json::from_str(json).context("Failed to parse layout JSON")?;
    Ok(parse_layout_value(&raw))
}

/// Like [`parse_layout`], for an already decoded document.
#[must_use]
pub fn parse_layout_value(raw: &Value) -> ParsedLayout {
    let migration = migrate(raw);
    let mut report = validate_structure(&migration.data);

    let layout = match serde_json::from_value::<Layout>(migration.data.clone()) {
        Ok(layout) => {
            report.merge(validate_layout(&layout));
            Some(layout)
        }
        Err(e) => {
            debug!("Layout did not deserialize: {e}");
            if report.is_valid() {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    format!("Layout could not be read: {e}"),
                ));
            }
            None
        }
    };

    ParsedLayout {
        layout,
        report,
        migration,
    }
}

/// Serializes a layout in the canonical export format (pretty JSON, current
/// schema version, transient editor state omitted).
///
/// # Examples
///
/// ```
/// use rackplan::models::{Layout, Rack};
/// use rackplan::services::layouts::{export_layout, import_layout};
///
/// let layout = Layout::new("Lab", Rack::new("Main", 42).unwrap());
/// let json = export_layout(&layout).unwrap();
/// assert!(!json.contains("\"view\""));
/// assert_eq!(import_layout(&json).unwrap(), layout);
/// ```
pub fn export_layout(layout: &Layout) -> Result<String> {
    let mut canonical = layout.clone();
    canonical.version = CURRENT_SCHEMA_VERSION.to_string();
    serde_json::to_string_pretty(&canonical).context("Failed to serialize layout")
}

/// Imports a serialized layout, rejecting anything that does not validate.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, the document cannot be read as
/// a layout, or validation reports errors.
pub fn import_layout(json: &str) -> Result<Layout> {
    let parsed = parse_layout(json)?;
    match parsed.layout {
        Some(layout) if parsed.report.is_valid() => Ok(layout),
        _ => anyhow::bail!("Layout is invalid:\n{}", parsed.report.format_message()),
    }
}

/// Service for managing layout file I/O operations.
///
/// This service centralizes all layout file operations to ensure consistent
/// handling of file paths, error messages, and file system operations.
pub struct LayoutService;

impl LayoutService {
    /// Loads a layout file, migrating and validating it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use rackplan::services::LayoutService;
    ///
    /// let parsed = LayoutService::load(Path::new("garage.json"))?;
    /// println!("{}", parsed.report.format_message());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<ParsedLayout> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
        parse_layout(&content)
            .with_context(|| format!("Failed to load layout from {}", path.display()))
    }

    /// Saves a layout in the canonical export format.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state.
    pub fn save(layout: &Layout, path: &Path) -> Result<()> {
        let content = export_layout(layout)?;
        write_atomic(path, &content)
            .with_context(|| format!("Failed to save layout to {}", path.display()))
    }
}

/// Writes `content` to `path` through a sibling temp file and a rename.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}
