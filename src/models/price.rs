//! Price values and examples.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::models::RawRecord;
use crate::utils::extract_amount;

/// A price as written in the source data: either a bare number or text
/// such as `"¥150,000~"` or `"Varies"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(Number),
    Text(String),
}

impl PriceValue {
    /// Interpret a raw JSON value as a price.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.trim().to_string())),
            _ => None,
        }
    }

    /// Leading numeric amount, if any.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => extract_amount(s),
        }
    }
}

impl fmt::Display for PriceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One example product with its price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceExample {
    /// Product label, e.g. "Full suit"
    #[serde(rename = "type")]
    pub label: String,

    /// Price, rewritten to a composed display string after conversion
    pub price: PriceValue,

    /// Optional purchase link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl PriceExample {
    /// Build an example from a raw entry. Entries without a price are
    /// not examples and yield `None`.
    pub fn from_raw(raw: RawRecord<'_>) -> Option<Self> {
        let price = raw.value(&["price"]).and_then(PriceValue::from_value)?;
        Some(Self {
            label: raw
                .text(&["type", "label"])
                .unwrap_or_else(|| "Other".to_string()),
            price,
            link: raw.text(&["link", "url"]),
        })
    }
}
