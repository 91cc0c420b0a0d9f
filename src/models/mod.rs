//! Data models for rack layouts, placed devices and device types.
//!
//! This module contains all the core data structures used throughout the application.
//! Models are designed to be independent of UI and business logic.

pub mod device_type;
pub mod images;
pub mod layout;
pub mod rack;
pub mod slug;

// Re-export all model types
pub use device_type::{Airflow, DeviceCategory, DeviceType, WeightUnit};
pub use images::{DeviceImages, ImageStore};
pub use layout::{DisplayMode, Layout, LayoutSettings};
pub use rack::{Face, FormFactor, PlacedDevice, Rack, RackView, URange};
