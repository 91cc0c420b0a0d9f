//! Auxiliary device images.
//!
//! Images are stored outside the layout document, keyed by device-type slug
//! (or by legacy library identifier before migration).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Front and rear artwork for one device type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceImages {
    /// Front image reference (URL or data URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    /// Rear image reference (URL or data URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rear: Option<String>,
}

impl DeviceImages {
    /// Returns true if neither side has an image.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.front.is_none() && self.rear.is_none()
    }
}

/// Image store keyed by device-type slug.
pub type ImageStore = BTreeMap<String, DeviceImages>;
