//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name, schema version and rack bounds.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "RackPlan";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "rackplan";

/// Schema version written by the current serializer.
pub const CURRENT_SCHEMA_VERSION: &str = "0.2.0";

/// Storage key under which the editing session is persisted.
pub const SESSION_STORAGE_KEY: &str = "rackplan-session";

/// Smallest rack height accepted, in rack units.
pub const MIN_RACK_HEIGHT: u32 = 1;

/// Largest rack height accepted, in rack units.
pub const MAX_RACK_HEIGHT: u32 = 100;

/// Largest unit number a rack may start at or a device may be placed at.
///
/// Leaves headroom so a full-height range above it still fits in a `u32`.
pub const MAX_UNIT_NUMBER: u32 = u32::MAX - 2 * MAX_RACK_HEIGHT;

/// Smallest device height accepted anywhere, in rack units.
pub const MIN_DEVICE_HEIGHT: f64 = 0.5;

/// Largest device height accepted from imported files.
pub const MAX_IMPORT_DEVICE_HEIGHT: f64 = 100.0;

/// Largest device height accepted from interactive entry.
pub const MAX_UI_DEVICE_HEIGHT: f64 = 42.0;

/// Rack widths (inches) that can be represented.
pub const RACK_WIDTHS: [u8; 2] = [10, 19];

/// Height given to a rack synthesized for documents that carry none.
pub const DEFAULT_RACK_HEIGHT: u32 = 42;

/// Default number of undo steps kept by the command log.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Default window (milliseconds) within which repeated edits merge into one undo step.
pub const DEFAULT_COALESCE_WINDOW_MS: u64 = 1000;
