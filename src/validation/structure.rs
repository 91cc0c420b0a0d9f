//! Structural validation of untrusted layout documents.

use serde_json::{Map, Value};

use super::{ValidationError, ValidationErrorKind, ValidationReport};
use crate::constants::{
    MAX_IMPORT_DEVICE_HEIGHT, MAX_RACK_HEIGHT, MAX_UNIT_NUMBER, MIN_DEVICE_HEIGHT,
    MIN_RACK_HEIGHT, RACK_WIDTHS,
};
use crate::models::slug::{is_valid_colour, is_valid_slug};
use crate::models::{Airflow, DeviceCategory};

const FACES: &[&str] = &["front", "rear", "both"];
const VIEWS: &[&str] = &["front", "rear"];
const FORM_FACTORS: &[&str] = &["2-post", "4-post", "4-post-cabinet", "wall-mount", "open-frame"];
const WEIGHT_UNITS: &[&str] = &["kg", "lb"];
const DISPLAY_MODES: &[&str] = &["label", "image"];

/// Checks a JSON document against the current layout schema.
///
/// Every problem found is recorded; the function never fails. Documents at
/// older schema versions should be migrated first.
///
/// # Examples
///
/// ```
/// use rackplan::validation::validate_structure;
/// use serde_json::json;
///
/// let report = validate_structure(&json!({
///     "version": "0.2.0",
///     "name": "Lab",
///     "rack": { "name": "Main", "height": 0, "devices": [] },
///     "device_types": {}
/// }));
/// assert!(!report.is_valid());
/// assert!(report.messages()[0].contains("rack.height"));
/// ```
#[must_use]
pub fn validate_structure(document: &Value) -> ValidationReport {
    let mut checker = Checker::default();

    let Some(root) = document.as_object() else {
        checker.error(
            ValidationErrorKind::WrongType,
            "$",
            "Layout document must be a JSON object",
        );
        return checker.report;
    };

    checker.require_string(root, "version", "version");
    checker.require_string(root, "name", "name");

    match root.get("rack") {
        None => checker.error(ValidationErrorKind::MissingField, "rack", "Missing field 'rack'"),
        Some(Value::Object(rack)) => checker.check_rack(rack),
        Some(_) => checker.error(ValidationErrorKind::WrongType, "rack", "'rack' must be an object"),
    }

    match root.get("device_types") {
        None => {}
        Some(Value::Object(types)) => {
            for (key, entry) in types {
                checker.check_device_type(key, entry);
            }
        }
        Some(_) => checker.error(
            ValidationErrorKind::WrongType,
            "device_types",
            "'device_types' must be an object keyed by slug",
        ),
    }

    match root.get("settings") {
        None => {}
        Some(Value::Object(settings)) => {
            checker.optional_enum(settings, "display_mode", "settings.display_mode", DISPLAY_MODES);
            checker.optional_bool(settings, "show_labels_on_images", "settings.show_labels_on_images");
            checker.optional_bool(settings, "show_airflow", "settings.show_airflow");
        }
        Some(_) => checker.error(
            ValidationErrorKind::WrongType,
            "settings",
            "'settings' must be an object",
        ),
    }

    checker.report
}

#[derive(Default)]
struct Checker {
    report: ValidationReport,
}

impl Checker {
    fn error(&mut self, kind: ValidationErrorKind, path: &str, message: impl Into<String>) {
        self.report
            .add_error(ValidationError::new(kind, message).at(path));
    }

    fn check_rack(&mut self, rack: &Map<String, Value>) {
        self.optional_string(rack, "name", "rack.name");
        if let Some(height) = self.require_integer(rack, "height", "rack.height") {
            if !(u64::from(MIN_RACK_HEIGHT)..=u64::from(MAX_RACK_HEIGHT)).contains(&height) {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    "rack.height",
                    format!(
                        "Rack height {height}U must be between {MIN_RACK_HEIGHT}U and {MAX_RACK_HEIGHT}U"
                    ),
                );
            }
        }
        if let Some(width) = self.optional_integer(rack, "width", "rack.width") {
            if !RACK_WIDTHS.iter().any(|w| u64::from(*w) == width) {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    "rack.width",
                    format!("Rack width {width}\" must be 10\" or 19\""),
                );
            }
        }
        self.optional_bool(rack, "desc_units", "rack.desc_units");
        if let Some(start) = self.optional_integer(rack, "starting_unit", "rack.starting_unit") {
            if start == 0 {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    "rack.starting_unit",
                    "Starting unit must be at least 1",
                );
            } else if start > u64::from(MAX_UNIT_NUMBER) {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    "rack.starting_unit",
                    format!("Starting unit {start} must be at most {MAX_UNIT_NUMBER}"),
                );
            }
        }
        self.optional_enum(rack, "form_factor", "rack.form_factor", FORM_FACTORS);
        self.optional_enum(rack, "view", "rack.view", VIEWS);

        match rack.get("devices") {
            None => {}
            Some(Value::Array(devices)) => {
                for (idx, device) in devices.iter().enumerate() {
                    self.check_placed_device(idx, device);
                }
            }
            Some(_) => self.error(
                ValidationErrorKind::WrongType,
                "rack.devices",
                "'rack.devices' must be an array",
            ),
        }
    }

    fn check_placed_device(&mut self, idx: usize, device: &Value) {
        let path = format!("rack.devices[{idx}]");
        let Some(device) = device.as_object() else {
            self.error(ValidationErrorKind::WrongType, &path, "Placed device must be an object");
            return;
        };

        self.require_string(device, "id", &format!("{path}.id"));
        self.require_string(device, "device_type", &format!("{path}.device_type"));
        if let Some(position) = self.require_integer(device, "position", &format!("{path}.position")) {
            if position == 0 {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    &format!("{path}.position"),
                    "Position must be at least 1",
                );
            } else if position > u64::from(MAX_UNIT_NUMBER) {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    &format!("{path}.position"),
                    format!("Position {position} must be at most {MAX_UNIT_NUMBER}"),
                );
            }
        }
        self.optional_enum(device, "face", &format!("{path}.face"), FACES);
        self.optional_string(device, "name", &format!("{path}.name"));
    }

    fn check_device_type(&mut self, key: &str, entry: &Value) {
        let path = format!("device_types.{key}");
        let Some(entry) = entry.as_object() else {
            self.error(ValidationErrorKind::WrongType, &path, "Device type must be an object");
            return;
        };

        if let Some(slug) = self.require_string(entry, "slug", &format!("{path}.slug")) {
            if !is_valid_slug(slug) {
                self.error(
                    ValidationErrorKind::InvalidSlug,
                    &format!("{path}.slug"),
                    format!("Slug '{slug}' must be lowercase letters and digits separated by single hyphens"),
                );
            } else if slug != key {
                self.error(
                    ValidationErrorKind::InvalidSlug,
                    &format!("{path}.slug"),
                    format!("Slug '{slug}' does not match its catalogue key '{key}'"),
                );
            }
        }

        if let Some(height) = self.require_number(entry, "u_height", &format!("{path}.u_height")) {
            if !(MIN_DEVICE_HEIGHT..=MAX_IMPORT_DEVICE_HEIGHT).contains(&height) {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    &format!("{path}.u_height"),
                    format!(
                        "Device height {height}U must be between {MIN_DEVICE_HEIGHT}U and {MAX_IMPORT_DEVICE_HEIGHT}U"
                    ),
                );
            }
        }

        let category_path = format!("{path}.category");
        if let Some(category) = self.require_string(entry, "category", &category_path) {
            if DeviceCategory::parse(category).is_none() {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    &category_path,
                    format!("Unknown category '{category}'"),
                );
            }
        }

        self.optional_bool(entry, "is_full_depth", &format!("{path}.is_full_depth"));

        let airflow_path = format!("{path}.airflow");
        if let Some(airflow) = self.optional_string(entry, "airflow", &airflow_path) {
            if Airflow::parse(airflow).is_none() {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    &airflow_path,
                    format!("Unknown airflow '{airflow}'"),
                );
            }
        }

        self.optional_string(entry, "manufacturer", &format!("{path}.manufacturer"));
        self.optional_string(entry, "model", &format!("{path}.model"));
        self.optional_string(entry, "notes", &format!("{path}.notes"));
        if let Some(weight) = self.optional_number(entry, "weight", &format!("{path}.weight")) {
            if weight < 0.0 {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    &format!("{path}.weight"),
                    "Weight cannot be negative",
                );
            }
        }
        self.optional_enum(entry, "weight_unit", &format!("{path}.weight_unit"), WEIGHT_UNITS);

        let colour_path = format!("{path}.colour");
        if let Some(colour) = self.optional_string(entry, "colour", &colour_path) {
            if !is_valid_colour(colour) {
                self.error(
                    ValidationErrorKind::InvalidColour,
                    &colour_path,
                    format!("Colour '{colour}' must be a hex value like #RRGGBB"),
                );
            }
        }
    }

    fn require_string<'v>(&mut self, obj: &'v Map<String, Value>, key: &str, path: &str) -> Option<&'v str> {
        if obj.get(key).map_or(true, Value::is_null) {
            self.error(ValidationErrorKind::MissingField, path, format!("Missing field '{key}'"));
            return None;
        }
        self.optional_string(obj, key, path)
    }

    fn optional_string<'v>(&mut self, obj: &'v Map<String, Value>, key: &str, path: &str) -> Option<&'v str> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.error(ValidationErrorKind::WrongType, path, format!("'{key}' must be a string"));
                None
            }
        }
    }

    fn require_integer(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<u64> {
        if obj.get(key).map_or(true, Value::is_null) {
            self.error(ValidationErrorKind::MissingField, path, format!("Missing field '{key}'"));
            return None;
        }
        self.optional_integer(obj, key, path)
    }

    fn optional_integer(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<u64> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let parsed = value.as_u64().filter(|n| *n <= u64::from(u32::MAX));
                if parsed.is_none() {
                    self.error(
                        ValidationErrorKind::WrongType,
                        path,
                        format!("'{key}' must be a non-negative integer"),
                    );
                }
                parsed
            }
        }
    }

    fn require_number(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
        if obj.get(key).map_or(true, Value::is_null) {
            self.error(ValidationErrorKind::MissingField, path, format!("Missing field '{key}'"));
            return None;
        }
        self.optional_number(obj, key, path)
    }

    fn optional_number(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                self.error(ValidationErrorKind::WrongType, path, format!("'{key}' must be a number"));
                None
            }
        }
    }

    fn optional_bool(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        if let Some(value) = obj.get(key) {
            if !value.is_boolean() && !value.is_null() {
                self.error(ValidationErrorKind::WrongType, path, format!("'{key}' must be a boolean"));
            }
        }
    }

    fn optional_enum(&mut self, obj: &Map<String, Value>, key: &str, path: &str, allowed: &[&str]) {
        if let Some(value) = self.optional_string(obj, key, path) {
            if !allowed.contains(&value) {
                self.error(
                    ValidationErrorKind::InvalidValue,
                    path,
                    format!("'{key}' must be one of {}, got '{value}'", allowed.join(", ")),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "version": "0.2.0",
            "name": "Homelab",
            "rack": {
                "name": "Main",
                "height": 24,
                "width": 19,
                "desc_units": false,
                "starting_unit": 1,
                "form_factor": "4-post-cabinet",
                "devices": [
                    { "id": "a", "device_type": "server", "position": 1, "face": "front" }
                ]
            },
            "device_types": {
                "server": {
                    "slug": "server",
                    "u_height": 2,
                    "category": "server",
                    "is_full_depth": true,
                    "airflow": "front-to-rear",
                    "colour": "#112233"
                }
            },
            "settings": { "display_mode": "label", "show_labels_on_images": false }
        })
    }

    fn kinds(report: &ValidationReport) -> Vec<ValidationErrorKind> {
        report.errors.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_document() {
        let report = validate_structure(&valid_document());
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_non_object_root() {
        let report = validate_structure(&json!([1, 2, 3]));
        assert_eq!(kinds(&report), vec![ValidationErrorKind::WrongType]);
    }

    #[test]
    fn test_missing_required_fields() {
        let report = validate_structure(&json!({}));
        assert_eq!(
            kinds(&report),
            vec![
                ValidationErrorKind::MissingField,
                ValidationErrorKind::MissingField,
                ValidationErrorKind::MissingField
            ]
        );
        assert_eq!(report.errors[2].path.as_deref(), Some("rack"));
    }

    #[test]
    fn test_rack_height_bounds() {
        let mut doc = valid_document();
        doc["rack"]["height"] = json!(101);
        let report = validate_structure(&doc);
        assert_eq!(kinds(&report), vec![ValidationErrorKind::InvalidValue]);

        doc["rack"]["height"] = json!("42");
        let report = validate_structure(&doc);
        assert_eq!(kinds(&report), vec![ValidationErrorKind::WrongType]);
    }

    #[test]
    fn test_rack_width() {
        let mut doc = valid_document();
        doc["rack"]["width"] = json!(23);
        assert_eq!(
            kinds(&validate_structure(&doc)),
            vec![ValidationErrorKind::InvalidValue]
        );
    }

    #[test]
    fn test_bad_slug_and_key_mismatch() {
        let mut doc = valid_document();
        doc["device_types"]["server"]["slug"] = json!("Server_1");
        let report = validate_structure(&doc);
        assert_eq!(kinds(&report), vec![ValidationErrorKind::InvalidSlug]);

        doc["device_types"]["server"]["slug"] = json!("switch");
        let report = validate_structure(&doc);
        assert_eq!(kinds(&report), vec![ValidationErrorKind::InvalidSlug]);
        assert!(report.errors[0].message.contains("catalogue key"));
    }

    #[test]
    fn test_bad_colour() {
        let mut doc = valid_document();
        doc["device_types"]["server"]["colour"] = json!("#12345");
        assert_eq!(
            kinds(&validate_structure(&doc)),
            vec![ValidationErrorKind::InvalidColour]
        );
    }

    #[test]
    fn test_device_height_import_leniency() {
        let mut doc = valid_document();
        doc["device_types"]["server"]["u_height"] = json!(100);
        assert!(validate_structure(&doc).is_valid());

        doc["device_types"]["server"]["u_height"] = json!(0.25);
        assert_eq!(
            kinds(&validate_structure(&doc)),
            vec![ValidationErrorKind::InvalidValue]
        );
    }

    #[test]
    fn test_unknown_enums() {
        let mut doc = valid_document();
        doc["device_types"]["server"]["category"] = json!("toaster");
        doc["device_types"]["server"]["airflow"] = json!("upwards");
        doc["rack"]["devices"][0]["face"] = json!("top");
        let report = validate_structure(&doc);
        assert_eq!(report.errors.len(), 3);
        assert!(report
            .errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvalidValue));
    }

    #[test]
    fn test_placed_device_fields() {
        let mut doc = valid_document();
        doc["rack"]["devices"] = json!([{ "device_type": 7, "position": 0 }]);
        let report = validate_structure(&doc);
        assert_eq!(
            kinds(&report),
            vec![
                ValidationErrorKind::MissingField,
                ValidationErrorKind::WrongType,
                ValidationErrorKind::InvalidValue
            ]
        );
        assert_eq!(report.errors[0].path.as_deref(), Some("rack.devices[0].id"));
    }

    #[test]
    fn test_unit_numbers_near_u32_max() {
        let mut doc = valid_document();
        doc["rack"]["starting_unit"] = json!(u32::MAX);
        doc["rack"]["devices"][0]["position"] = json!(u32::MAX);
        let report = validate_structure(&doc);
        assert_eq!(
            kinds(&report),
            vec![ValidationErrorKind::InvalidValue, ValidationErrorKind::InvalidValue]
        );
        assert_eq!(report.errors[0].path.as_deref(), Some("rack.starting_unit"));
        assert_eq!(report.errors[1].path.as_deref(), Some("rack.devices[0].position"));

        doc["rack"]["starting_unit"] = json!(MAX_UNIT_NUMBER);
        doc["rack"]["devices"][0]["position"] = json!(MAX_UNIT_NUMBER);
        assert!(validate_structure(&doc).is_valid());
    }

    #[test]
    fn test_device_types_must_be_object() {
        let mut doc = valid_document();
        doc["device_types"] = json!([]);
        assert_eq!(
            kinds(&validate_structure(&doc)),
            vec![ValidationErrorKind::WrongType]
        );
    }
}
