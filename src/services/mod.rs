//! Service layer for business logic.
//!
//! This module contains services that encapsulate complex business logic
//! and coordinate between different parts of the application.

pub mod layouts;
pub mod library_import;
pub mod occupancy;
pub mod session;

// Re-export commonly used types and functions
pub use layouts::{export_layout, import_layout, parse_layout, LayoutService, ParsedLayout};
pub use library_import::{import_device_library, LibraryImport};
pub use session::{
    clear_session, load_from_session, save_to_session, FileSessionStore, MemorySessionStore,
    SessionStore,
};
