//! RackPlan Library
//!
//! This library provides the model core of an equipment-rack layout editor:
//! rack-unit occupancy and conflict detection, layout validation, schema
//! migration of older files, an undo/redo command log, and layout, device
//! library and session persistence.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod history;
pub mod migration;
pub mod models;
pub mod services;
pub mod starter_library;
pub mod validation;
