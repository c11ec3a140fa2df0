//! Field extraction from a log entry's nested payload.

use serde_json::Value;
use std::collections::HashMap;

/// The key under which the agent places query result columns.
const COLUMNS_KEY: &str = "columns";

/// Extracted field values, keyed by field name.
///
/// Lookups of unknown names yield the empty string, so the template renderer
/// never has to distinguish "absent" from "empty".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(HashMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `name`, or `""` if it was never extracted.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Extracts each of `field_names` from `payload` at `columns.<name>`.
///
/// Dots in a field name descend into nested objects and numeric segments index
/// into arrays. Missing, null and non-scalar values all become `""`.
pub fn extract<S: AsRef<str>>(payload: &Value, field_names: &[S]) -> FieldValues {
    let columns = payload.get(COLUMNS_KEY);
    field_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let value = columns
                .and_then(|columns| lookup(columns, name))
                .map(scalar_text)
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn usb_payload() -> Value {
        json!({
            "name": "pack_hardware_usb_devices",
            "columns": {
                "vendor": "Acme",
                "model": "X1",
                "serial": "123",
                "port": 8080,
                "removable": true,
                "class": null,
                "tags": ["a", "b"],
                "meta": { "bus": "usb3" }
            }
        })
    }

    #[test]
    fn test_extracts_present_fields() {
        let values = extract(&usb_payload(), &["vendor", "model", "serial"]);
        assert_eq!(values.get("vendor"), "Acme");
        assert_eq!(values.get("model"), "X1");
        assert_eq!(values.get("serial"), "123");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_missing_fields_are_empty_strings() {
        let values = extract(&usb_payload(), &["vendor", "nope"]);
        assert_eq!(values.get("vendor"), "Acme");
        assert!(values.contains("nope"));
        assert_eq!(values.get("nope"), "");
    }

    #[test]
    fn test_null_and_non_scalar_fields_are_empty_strings() {
        let values = extract(&usb_payload(), &["class", "tags", "meta"]);
        assert_eq!(values.get("class"), "");
        assert_eq!(values.get("tags"), "");
        assert_eq!(values.get("meta"), "");
    }

    #[test]
    fn test_numbers_and_booleans_render_as_text() {
        let values = extract(&usb_payload(), &["port", "removable"]);
        assert_eq!(values.get("port"), "8080");
        assert_eq!(values.get("removable"), "true");
    }

    #[test]
    fn test_dotted_names_descend_into_nested_values() {
        let values = extract(&usb_payload(), &["meta.bus", "tags.1", "tags.9"]);
        assert_eq!(values.get("meta.bus"), "usb3");
        assert_eq!(values.get("tags.1"), "b");
        assert_eq!(values.get("tags.9"), "");
    }

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        let a = extract(&usb_payload(), &["vendor", "model", "vendor"]);
        let b = extract(&usb_payload(), &["model", "vendor"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_no_requested_fields_yields_empty_values() {
        let values = extract::<&str>(&usb_payload(), &[]);
        assert!(values.is_empty());
        assert!(!extract(&usb_payload(), &["vendor"]).is_empty());
    }

    #[test]
    fn test_payload_without_columns() {
        let values = extract(&json!({ "name": "x" }), &["vendor"]);
        assert_eq!(values.get("vendor"), "");

        let values = extract(&json!({ "columns": "flat" }), &["vendor"]);
        assert_eq!(values.get("vendor"), "");
    }
}
