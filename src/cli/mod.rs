//! CLI command handlers for RackPlan.
//!
//! This module provides headless, scriptable access to RackPlan's core functionality
//! for automation, testing, and CI/CD integration.

pub mod common;
pub mod import_library;
pub mod inspect;
pub mod library;
pub mod migrate;
pub mod session;
pub mod validate;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use import_library::ImportLibraryArgs;
pub use inspect::InspectArgs;
pub use library::LibraryArgs;
pub use migrate::MigrateArgs;
pub use session::SessionArgs;
pub use validate::ValidateArgs;
