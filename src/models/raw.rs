//! Lenient accessors over a parsed-but-unvalidated JSON record.
//!
//! Source files are hand-edited and disagree on key casing and value
//! types. Every accessor returns `None`/empty on a mismatch instead of
//! failing, so normalization only fails when the record is not an
//! object at all.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Borrowed view of a raw JSON object.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawRecord<'a> {
    /// Wrap a raw value, failing if it is not a JSON object.
    ///
    /// `source` names the record in the error (usually the file stem).
    pub fn new(value: &'a Value, source: &str) -> Result<Self> {
        value
            .as_object()
            .map(|fields| Self { fields })
            .ok_or_else(|| AppError::normalize(source, "expected a JSON object"))
    }

    /// First of `keys` holding a value.
    pub fn value(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find(|value| !value.is_null())
    }

    /// First of `keys` holding a non-blank string (numbers are stringified).
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().filter_map(|key| self.fields.get(*key)).find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// First of `keys` holding a number or a numeric string.
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().filter_map(|key| self.fields.get(*key)).find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        })
    }

    /// First of `keys` holding a boolean.
    pub fn boolean(&self, keys: &[&str]) -> Option<bool> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find_map(Value::as_bool)
    }

    /// Object of string values; non-string entries are dropped.
    pub fn string_map(&self, keys: &[&str]) -> BTreeMap<String, String> {
        self.object(keys)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| match v {
                        Value::String(s) if !s.trim().is_empty() => {
                            Some((k.clone(), s.trim().to_string()))
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Object of boolean values; non-boolean entries are dropped.
    pub fn bool_map(&self, keys: &[&str]) -> BTreeMap<String, bool> {
        self.object(keys)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Object of arbitrary values, kept as-is.
    pub fn value_map(&self, keys: &[&str]) -> BTreeMap<String, Value> {
        self.object(keys)
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Array elements, empty when missing or not an array.
    pub fn array(&self, keys: &[&str]) -> &'a [Value] {
        self.value(keys)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn object(&self, keys: &[&str]) -> Option<&'a Map<String, Value>> {
        self.value(keys).and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        let value = json!(["not", "a", "record"]);
        let err = RawRecord::new(&value, "broken").unwrap_err();
        assert!(matches!(err, AppError::Normalize { ref record, .. } if record == "broken"));
    }

    #[test]
    fn test_text_falls_through_keys() {
        let value = json!({"Region": "Osaka, Japan", "region": "  "});
        let raw = RawRecord::new(&value, "x").unwrap();
        assert_eq!(raw.text(&["region", "Region"]).as_deref(), Some("Osaka, Japan"));
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let value = json!({"a": "12,000", "b": 5, "c": "Varies"});
        let raw = RawRecord::new(&value, "x").unwrap();
        assert_eq!(raw.number(&["a"]), Some(12000.0));
        assert_eq!(raw.number(&["b"]), Some(5.0));
        assert_eq!(raw.number(&["c"]), None);
    }

    #[test]
    fn test_maps_drop_mismatched_values() {
        let value = json!({
            "socials": {"twitter": "https://x.com/a", "bad": 3},
            "features": {"commissions": true, "note": "yes"}
        });
        let raw = RawRecord::new(&value, "x").unwrap();
        assert_eq!(raw.string_map(&["socials"]).len(), 1);
        assert_eq!(raw.bool_map(&["features"]).get("commissions"), Some(&true));
        assert_eq!(raw.bool_map(&["features"]).len(), 1);
    }
}
