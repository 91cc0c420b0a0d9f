//! 0.1 documents: device types as an array and a list of racks.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::constants::DEFAULT_RACK_HEIGHT;

/// Converts a 0.1 document into the 0.2 shape.
///
/// The `device_types` array becomes an object keyed by slug and the first
/// entry of `racks` becomes the single `rack`. Additional racks are dropped.
pub(super) fn to_v0_2(root: &mut Map<String, Value>) {
    let device_types = match root.remove("device_types") {
        Some(Value::Array(entries)) => Value::Object(key_by_slug(entries)),
        Some(other) => other,
        None => Value::Object(Map::new()),
    };
    root.insert("device_types".to_string(), device_types);

    let racks = root.remove("racks");
    if root.contains_key("rack") {
        if racks.is_some() {
            warn!("Document has both 'rack' and 'racks'; ignoring 'racks'");
        }
        return;
    }

    let rack = match racks {
        Some(Value::Array(racks)) => {
            if racks.len() > 1 {
                warn!(
                    "Layout holds {} racks; keeping the first and dropping the rest",
                    racks.len()
                );
            }
            racks.into_iter().next()
        }
        Some(_) => {
            warn!("'racks' is not an array; replacing it with an empty rack");
            None
        }
        None => None,
    };

    let rack = rack.unwrap_or_else(|| {
        let name = root.get("name").and_then(Value::as_str).unwrap_or("Rack");
        json!({ "name": name, "height": DEFAULT_RACK_HEIGHT, "devices": [] })
    });
    root.insert("rack".to_string(), rack);
}

fn key_by_slug(entries: Vec<Value>) -> Map<String, Value> {
    let mut by_slug = Map::new();
    for entry in entries {
        let Some(slug) = entry.get("slug").and_then(Value::as_str).map(String::from) else {
            warn!("Dropping device type without a slug");
            continue;
        };
        if by_slug.contains_key(&slug) {
            warn!("Dropping duplicate device type '{slug}'");
            continue;
        }
        by_slug.insert(slug, entry);
    }
    by_slug
}
