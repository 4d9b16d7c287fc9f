// src/models/maker.rs

//! Mask maker records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::{PriceValue, RawRecord};

/// Placeholder name for records without one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Commission status of a maker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MakerStatus {
    Open,
    Closed,
    Beware,
}

/// Ordered keyword table, first match wins.
const STATUS_TABLE: &[(&str, MakerStatus)] = &[
    ("beware", MakerStatus::Beware),
    ("closed", MakerStatus::Closed),
    ("open", MakerStatus::Open),
];

impl MakerStatus {
    /// Classify free-text status, case-insensitively.
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        STATUS_TABLE
            .iter()
            .find(|(needle, _)| text.contains(needle))
            .map(|(_, status)| *status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MakerStatus::Open => "open",
            MakerStatus::Closed => "closed",
            MakerStatus::Beware => "beware",
        }
    }
}

impl fmt::Display for MakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a maker accepts orders in English: a flag, or an explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnglishOrdering {
    Supported(bool),
    Details(String),
}

impl EnglishOrdering {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Supported(*b)),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Details(s.trim().to_string())),
            _ => None,
        }
    }

    /// Free-text explanation, if the field is not a plain flag.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Details(s) => Some(s),
            Self::Supported(_) => None,
        }
    }
}

/// A kigurumi mask maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maker {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MakerStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Platform name to profile URL
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub socials: BTreeMap<String, String>,

    /// Free-text range, e.g. "$1,500 - $3,000"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_price: Option<PriceValue>,

    /// ISO code of `starting_price`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Starting price converted to the base currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_price_usd: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub price_details: BTreeMap<String, Value>,

    /// Product type, e.g. "Full head"
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_ordering: Option<EnglishOrdering>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hair_options: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Maker {
    /// Build a maker from a raw JSON record.
    ///
    /// This is the only place defaults are applied. Fails only when the
    /// value is not an object; `source` names the record in that error.
    pub fn from_raw(value: &Value, source: &str) -> Result<Self> {
        let raw = RawRecord::new(value, source)?;

        Ok(Self {
            name: raw
                .text(&["name"])
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            alias: raw.text(&["alias"]),
            website: raw.text(&["website", "url"]),
            status: raw
                .text(&["status", "Status"])
                .and_then(|s| MakerStatus::classify(&s)),
            region: raw.text(&["region", "Region"]),
            socials: raw.string_map(&["socials", "social"]),
            price_range: raw.text(&["priceRange", "price_range"]),
            starting_price: raw
                .value(&["startingPrice", "starting_price"])
                .and_then(PriceValue::from_value),
            currency: raw
                .text(&["currency", "Currency"])
                .map(|c| c.to_uppercase()),
            starting_price_usd: None,
            price_tier: raw.text(&["priceTier", "price_tier"]),
            price_details: raw.value_map(&["priceDetails", "price_details"]),
            kind: raw.text(&["type", "Type"]),
            size: raw.text(&["size", "Size"]),
            material: raw.text(&["material", "Material"]),
            english_ordering: raw
                .value(&["englishOrdering", "english_ordering"])
                .and_then(EnglishOrdering::from_value),
            features: raw.bool_map(&["features"]),
            hair_options: raw.value_map(&["hairOptions", "hair_options"]),
            notes: raw.text(&["notes", "Notes"]),
        })
    }

    /// Names of features switched on.
    pub fn enabled_features(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_only_record() {
        let maker = Maker::from_raw(&json!({"name": "Acme"}), "acme").unwrap();
        assert_eq!(maker.name, "Acme");
        assert!(maker.alias.is_none());
        assert!(maker.status.is_none());
        assert!(maker.socials.is_empty());
        assert!(maker.features.is_empty());
        assert!(maker.english_ordering.is_none());
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let maker = Maker::from_raw(&json!({"region": "Tokyo"}), "nameless").unwrap();
        assert_eq!(maker.name, UNKNOWN_NAME);
    }

    #[test]
    fn test_non_object_fails_with_source() {
        let err = Maker::from_raw(&json!("Acme"), "acme").unwrap_err();
        assert!(err.to_string().contains("acme"));
    }

    #[test]
    fn test_normalizes_field_variants() {
        let maker = Maker::from_raw(
            &json!({
                "name": "Studio K",
                "Region": "Tokyo, Japan",
                "status": "Commissions OPEN",
                "currency": "jpy",
                "startingPrice": 150000,
                "englishOrdering": "Via email only",
                "features": {"customEyes": true, "wigIncluded": false},
                "hairOptions": {"wig": "synthetic"}
            }),
            "studio-k",
        )
        .unwrap();

        assert_eq!(maker.region.as_deref(), Some("Tokyo, Japan"));
        assert_eq!(maker.status, Some(MakerStatus::Open));
        assert_eq!(maker.currency.as_deref(), Some("JPY"));
        assert_eq!(maker.starting_price.as_ref().and_then(PriceValue::amount), Some(150000.0));
        assert_eq!(
            maker.english_ordering,
            Some(EnglishOrdering::Details("Via email only".into()))
        );
        assert_eq!(maker.enabled_features().collect::<Vec<_>>(), vec!["customEyes"]);
        assert_eq!(maker.hair_options.len(), 1);
    }

    #[test]
    fn test_status_classification_order() {
        assert_eq!(MakerStatus::classify("Beware (closed)"), Some(MakerStatus::Beware));
        assert_eq!(MakerStatus::classify("Closed"), Some(MakerStatus::Closed));
        assert_eq!(MakerStatus::classify("hiatus"), None);
    }

    #[test]
    fn test_serializes_camel_case_and_skips_empty() {
        let maker = Maker::from_raw(
            &json!({"name": "Acme", "priceRange": "$500+", "type": "Full head"}),
            "acme",
        )
        .unwrap();
        let json = serde_json::to_value(&maker).unwrap();
        assert_eq!(
            json,
            json!({"name": "Acme", "priceRange": "$500+", "type": "Full head"})
        );
    }
}
