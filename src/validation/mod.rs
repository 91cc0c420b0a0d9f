//! Layout validation.
//!
//! Two passes, both returning data instead of failing:
//!
//! - [`validate_structure`] checks an untrusted JSON document against the
//!   current schema (required fields, primitive types, patterns, ranges).
//! - [`validate_layout`] checks the business rules of a typed layout
//!   (dangling references, overlaps, out-of-rack placements) using the
//!   occupancy engine.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

mod rules;
mod structure;

pub use rules::validate_layout;
pub use structure::validate_structure;

use serde::Serialize;

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Problems that make the layout invalid
    pub errors: Vec<ValidationError>,
    /// Non-blocking findings (e.g., airflow conflicts)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Appends all findings of `other`, keeping order.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Error messages in the order they were found.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Returns true if any error has the given kind.
    #[must_use]
    pub fn has_error(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Formats the report as a user-friendly message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("{} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            message.push_str(&format!("{} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// JSON path of the offending value (e.g., "rack.devices[2].position")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Placed device involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            device_id: None,
            message: message.into(),
        }
    }

    /// Sets the JSON path context.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the placed device context.
    #[must_use]
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {} ({})", self.kind, self.message, path),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Required field absent
    MissingField,
    /// Field present with the wrong JSON type
    WrongType,
    /// Value outside its allowed range or set
    InvalidValue,
    /// Device-type slug does not match the slug pattern or its map key
    InvalidSlug,
    /// Colour is not #RRGGBB
    InvalidColour,
    /// Placed device references an undefined device type
    DanglingReference,
    /// Two placed devices reserve the same units on a shared face
    Overlap,
    /// Placed device extends outside the rack
    OutOfBounds,
    /// Two placed devices share an identifier
    DuplicateId,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField => write!(f, "Missing Field"),
            Self::WrongType => write!(f, "Wrong Type"),
            Self::InvalidValue => write!(f, "Invalid Value"),
            Self::InvalidSlug => write!(f, "Invalid Slug"),
            Self::InvalidColour => write!(f, "Invalid Colour"),
            Self::DanglingReference => write!(f, "Unknown Device Type"),
            Self::Overlap => write!(f, "Overlap"),
            Self::OutOfBounds => write!(f, "Out of Bounds"),
            Self::DuplicateId => write!(f, "Duplicate Id"),
        }
    }
}

/// Validation warning (non-blocking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
