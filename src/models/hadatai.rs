// src/models/hadatai.rs

//! Hadatai (full-body suit) vendor records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::{PriceExample, RawRecord, UNKNOWN_NAME};

/// Notes mentioning one of these require a purchasing agent. Checked first.
const AGENT_KEYWORDS: &[&str] = &[
    "buyee",
    "zenmarket",
    "fromjapan",
    "from japan",
    "sendico",
    "proxy service",
    "purchasing agent",
];

/// Notes mentioning one of these imply direct ordering in English.
const ENGLISH_KEYWORDS: &[&str] = &["website", "english", "international"];

/// A suit vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hadatai {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// ISO code the price examples are listed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub socials: BTreeMap<String, String>,

    #[serde(default)]
    pub price_examples: Vec<PriceExample>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub english_ordering: bool,
}

impl Hadatai {
    /// Build a vendor from a raw JSON record.
    ///
    /// An explicit `englishOrdering` flag wins; otherwise support is
    /// inferred from the notes and currency.
    pub fn from_raw(value: &Value, source: &str) -> Result<Self> {
        let raw = RawRecord::new(value, source)?;

        let name = raw
            .text(&["name"])
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let currency = raw
            .text(&["currency", "Currency"])
            .map(|c| c.to_uppercase());
        let notes = raw.text(&["notes", "Notes"]);

        let price_examples = raw
            .array(&["priceExamples", "price_examples", "prices"])
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let example = RawRecord::new(entry, &name)
                    .ok()
                    .and_then(PriceExample::from_raw);
                if example.is_none() {
                    log::warn!(
                        "Dropping price example {} of {}: no usable price",
                        index,
                        name
                    );
                }
                example
            })
            .collect();

        let english_ordering = raw
            .boolean(&["englishOrdering", "english_ordering"])
            .unwrap_or_else(|| infer_english_ordering(notes.as_deref(), currency.as_deref()));

        Ok(Self {
            name,
            region: raw.text(&["region", "Region"]),
            currency,
            socials: raw.string_map(&["socials", "social"]),
            price_examples,
            notes,
            english_ordering,
        })
    }
}

/// Guess English ordering support from free-text notes.
pub fn infer_english_ordering(notes: Option<&str>, currency: Option<&str>) -> bool {
    let notes = notes.unwrap_or_default().to_lowercase();

    if AGENT_KEYWORDS.iter().any(|k| notes.contains(k)) {
        return false;
    }

    ENGLISH_KEYWORDS.iter().any(|k| notes.contains(k))
        || currency.is_some_and(|c| c.eq_ignore_ascii_case("usd"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceValue;
    use serde_json::json;

    #[test]
    fn test_from_raw_collects_examples() {
        let vendor = Hadatai::from_raw(
            &json!({
                "name": "Skin Lab",
                "Region": "China",
                "currency": "cny",
                "priceExamples": [
                    {"type": "Full suit", "price": "3,200"},
                    {"type": "Gloves"},
                    "garbage",
                    {"type": "Tights", "price": 150, "link": "https://shop.example/t"}
                ]
            }),
            "skin-lab",
        )
        .unwrap();

        assert_eq!(vendor.region.as_deref(), Some("China"));
        assert_eq!(vendor.currency.as_deref(), Some("CNY"));
        assert_eq!(vendor.price_examples.len(), 2);
        assert_eq!(vendor.price_examples[0].price, PriceValue::Text("3,200".into()));
        assert_eq!(vendor.price_examples[1].label, "Tights");
        assert!(!vendor.english_ordering);
    }

    #[test]
    fn test_explicit_flag_wins() {
        let vendor = Hadatai::from_raw(
            &json!({"name": "A", "notes": "Order through Buyee", "englishOrdering": true}),
            "a",
        )
        .unwrap();
        assert!(vendor.english_ordering);
    }

    #[test]
    fn test_infer_english_ordering() {
        assert!(infer_english_ordering(Some("Orders via their WEBSITE"), None));
        assert!(infer_english_ordering(Some("Ships International"), Some("CNY")));
        assert!(infer_english_ordering(None, Some("USD")));
        assert!(!infer_english_ordering(None, Some("JPY")));
    }

    #[test]
    fn test_agent_requirement_overrides_support() {
        assert!(!infer_english_ordering(
            Some("English website, but checkout requires Buyee"),
            Some("USD")
        ));
    }
}
