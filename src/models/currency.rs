//! Exchange-rate snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::utils::group_thousands;

/// Built-in rates, used when neither the cache nor the feed is available.
/// Units of each currency per 1 USD.
const FALLBACK_DATE: &str = "2025-01-01";
const FALLBACK_RATES: &[(&str, f64)] = &[
    ("usd", 1.0),
    ("jpy", 157.0),
    ("cny", 7.3),
    ("krw", 1470.0),
    ("twd", 32.8),
    ("hkd", 7.77),
    ("eur", 0.96),
    ("gbp", 0.80),
    ("cad", 1.44),
    ("aud", 1.61),
    ("thb", 34.1),
    ("sgd", 1.36),
    ("php", 57.9),
    ("myr", 4.47),
];

/// Where a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Cache,
    Remote,
    /// A cache older than the configured age, kept because the feed failed
    StaleCache,
    Fallback,
}

/// Rates relative to a base currency: `rates[code]` units of `code` buy
/// one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionTable {
    pub date: String,
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

impl ConversionTable {
    /// The embedded static table.
    pub fn fallback() -> Self {
        Self {
            date: FALLBACK_DATE.to_string(),
            base: "usd".to_string(),
            rates: FALLBACK_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }

    /// Decode a feed body shaped `{"date": "...", "<base>": {code: rate}}`.
    pub fn from_feed(body: &Value, base: &str) -> Result<Self> {
        let base = base.to_lowercase();
        let date = body
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::validation("rate feed has no date"))?;
        let rates: BTreeMap<String, f64> = body
            .get(&base)
            .and_then(Value::as_object)
            .ok_or_else(|| AppError::validation(format!("rate feed has no '{base}' table")))?
            .iter()
            .filter_map(|(code, rate)| {
                rate.as_f64()
                    .filter(|r| *r > 0.0)
                    .map(|r| (code.to_lowercase(), r))
            })
            .collect();

        if rates.is_empty() {
            return Err(AppError::validation("rate feed table is empty"));
        }

        Ok(Self {
            date: date.to_string(),
            base,
            rates,
        })
    }

    /// Rate for a currency code, case-insensitive.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_lowercase()).copied()
    }

    /// Convert an amount into the base currency, rounded to whole units.
    pub fn to_base(&self, amount: f64, code: &str) -> Option<i64> {
        let rate = self.rate(code).filter(|r| *r > 0.0)?;
        Some((amount / rate).round() as i64)
    }

    /// Compose the display string `"$10 USD (1000 JPY)"`.
    pub fn display_price(&self, converted: i64, original: &str, code: &str) -> String {
        format!(
            "${} {} ({} {})",
            group_thousands(converted),
            self.base.to_uppercase(),
            original,
            code.to_uppercase()
        )
    }

    /// Days between the table date and `today`, `None` if undated.
    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        Some((today - date).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> ConversionTable {
        ConversionTable {
            date: "2026-01-01".into(),
            base: "usd".into(),
            rates: [("jpy".to_string(), 100.0), ("usd".to_string(), 1.0)].into(),
        }
    }

    #[test]
    fn test_to_base_divides_by_rate() {
        assert_eq!(table().to_base(1000.0, "JPY"), Some(10));
        assert_eq!(table().to_base(1049.0, "jpy"), Some(10));
        assert_eq!(table().to_base(1050.0, "jpy"), Some(11));
    }

    #[test]
    fn test_unknown_currency() {
        assert_eq!(table().to_base(1000.0, "XYZ"), None);
    }

    #[test]
    fn test_display_price() {
        assert_eq!(table().display_price(10, "1000", "jpy"), "$10 USD (1000 JPY)");
        assert_eq!(
            table().display_price(1500, "150,000", "JPY"),
            "$1,500 USD (150,000 JPY)"
        );
    }

    #[test]
    fn test_from_feed() {
        let body = json!({"date": "2026-03-01", "usd": {"jpy": 150.5, "EUR": 0.9, "bad": "x", "zero": 0}});
        let table = ConversionTable::from_feed(&body, "USD").unwrap();
        assert_eq!(table.date, "2026-03-01");
        assert_eq!(table.rate("eur"), Some(0.9));
        assert_eq!(table.rates.len(), 2);
    }

    #[test]
    fn test_from_feed_rejects_wrong_shape() {
        assert!(ConversionTable::from_feed(&json!({"date": "2026-03-01"}), "usd").is_err());
        assert!(ConversionTable::from_feed(&json!({"usd": {"jpy": 1.0}}), "usd").is_err());
    }

    #[test]
    fn test_fallback_has_common_codes() {
        let table = ConversionTable::fallback();
        assert_eq!(table.rate("usd"), Some(1.0));
        assert!(table.rate("jpy").is_some());
        assert!(table.rate("cny").is_some());
    }

    #[test]
    fn test_age_days() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert_eq!(table().age_days(today), Some(2));
    }
}
