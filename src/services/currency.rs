// src/services/currency.rs

//! Exchange-rate loading and price conversion.
//!
//! The table is resolved once per build: a fresh cache file wins, then the
//! remote feed (written back to the cache), then a stale cache, then the
//! embedded fallback. Loading never fails.

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    ConversionTable, CurrencyConfig, Hadatai, Maker, PriceExample, PriceValue, RateSource,
};
use crate::storage::{ArtifactStorage, read_json, write_json};
use crate::utils::http::fetch_json;

/// Loads the conversion table for a build.
pub struct RateLoader<'a> {
    client: &'a Client,
    cache: &'a dyn ArtifactStorage,
    config: &'a CurrencyConfig,
}

impl<'a> RateLoader<'a> {
    pub fn new(
        client: &'a Client,
        cache: &'a dyn ArtifactStorage,
        config: &'a CurrencyConfig,
    ) -> Self {
        Self {
            client,
            cache,
            config,
        }
    }

    /// Resolve the table, reporting where it came from.
    pub async fn load(&self, today: NaiveDate) -> (ConversionTable, RateSource) {
        let cached = self.read_cache().await;

        if let Some(table) = &cached {
            let age = table.age_days(today);
            if age.is_some_and(|days| days <= self.config.max_age_days) {
                log::info!("Exchange rates: using cache dated {}", table.date);
                return (table.clone(), RateSource::Cache);
            }
            log::info!("Exchange rates: cache dated {} is stale, refreshing", table.date);
        }

        match self.fetch_remote().await {
            Ok(table) => {
                log::info!("Exchange rates: fetched table dated {}", table.date);
                if let Err(e) = write_json(self.cache, &self.config.cache_file, &table).await {
                    log::warn!(
                        "Failed to write exchange-rate cache {}: {}",
                        self.cache.location(&self.config.cache_file),
                        e
                    );
                }
                (table, RateSource::Remote)
            }
            Err(e) => {
                log::warn!("Failed to fetch exchange rates from {}: {}", self.config.feed_url, e);
                match cached {
                    Some(table) => {
                        log::warn!("Exchange rates: falling back to stale cache dated {}", table.date);
                        (table, RateSource::StaleCache)
                    }
                    None => {
                        log::warn!("Exchange rates: using built-in fallback table");
                        (ConversionTable::fallback(), RateSource::Fallback)
                    }
                }
            }
        }
    }

    async fn read_cache(&self) -> Option<ConversionTable> {
        match read_json::<ConversionTable>(self.cache, &self.config.cache_file).await {
            Ok(Some(table)) if table.base.eq_ignore_ascii_case(&self.config.base) => Some(table),
            Ok(Some(table)) => {
                log::warn!(
                    "Ignoring exchange-rate cache with base '{}' (expected '{}')",
                    table.base,
                    self.config.base
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!(
                    "Unreadable exchange-rate cache {}: {}",
                    self.cache.location(&self.config.cache_file),
                    e
                );
                None
            }
        }
    }

    async fn fetch_remote(&self) -> Result<ConversionTable> {
        let body: Value = fetch_json(self.client, &self.config.feed_url, &[]).await?;
        ConversionTable::from_feed(&body, &self.config.base)
    }
}

/// Rewrite a price example as `"$<converted> USD (<original> <code>)"`.
///
/// Prices without a number (e.g. "Varies") and unknown currencies are
/// left untouched. Returns whether the example was converted.
pub fn convert_price_example(
    example: &mut PriceExample,
    code: &str,
    table: &ConversionTable,
) -> bool {
    let Some(amount) = example.price.amount() else {
        return false;
    };
    let Some(converted) = table.to_base(amount, code) else {
        log::warn!("Unknown currency '{}' for price '{}'", code, example.price);
        return false;
    };

    let original = example.price.to_string();
    example.price = PriceValue::Text(table.display_price(converted, &original, code));
    true
}

/// Convert every price example of a vendor listed with a currency.
pub fn convert_hadatai(vendor: &mut Hadatai, table: &ConversionTable) -> usize {
    let Some(code) = vendor.currency.clone() else {
        return 0;
    };
    vendor
        .price_examples
        .iter_mut()
        .map(|example| convert_price_example(example, &code, table))
        .filter(|converted| *converted)
        .count()
}

/// Derive the maker's starting price in the base currency.
pub fn convert_maker(maker: &mut Maker, table: &ConversionTable) -> bool {
    let (Some(price), Some(code)) = (&maker.starting_price, &maker.currency) else {
        return false;
    };
    let Some(amount) = price.amount() else {
        return false;
    };

    match table.to_base(amount, code) {
        Some(converted) => {
            maker.starting_price_usd = Some(converted);
            true
        }
        None => {
            log::warn!("Unknown currency '{}' for maker '{}'", code, maker.name);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn table() -> ConversionTable {
        ConversionTable {
            date: "2026-01-01".into(),
            base: "usd".into(),
            rates: [("jpy".to_string(), 100.0)].into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn config(feed_url: &str) -> CurrencyConfig {
        CurrencyConfig {
            feed_url: feed_url.to_string(),
            ..CurrencyConfig::default()
        }
    }

    #[test]
    fn test_convert_example() {
        let mut example = PriceExample {
            label: "Mask".into(),
            price: PriceValue::Text("1000".into()),
            link: None,
        };
        assert!(convert_price_example(&mut example, "JPY", &table()));
        assert_eq!(example.price, PriceValue::Text("$10 USD (1000 JPY)".into()));
    }

    #[test]
    fn test_varies_passes_through() {
        let mut example = PriceExample {
            label: "Custom".into(),
            price: PriceValue::Text("Varies".into()),
            link: None,
        };
        let before = example.clone();
        assert!(!convert_price_example(&mut example, "JPY", &table()));
        assert_eq!(example, before);
    }

    #[test]
    fn test_unknown_currency_passes_through() {
        let mut example = PriceExample {
            label: "Mask".into(),
            price: PriceValue::Text("500".into()),
            link: None,
        };
        assert!(!convert_price_example(&mut example, "XYZ", &table()));
        assert_eq!(example.price, PriceValue::Text("500".into()));
    }

    #[test]
    fn test_convert_hadatai_requires_currency() {
        let mut vendor = Hadatai::from_raw(
            &json!({"name": "A", "priceExamples": [{"type": "Suit", "price": 1000}]}),
            "a",
        )
        .unwrap();
        assert_eq!(convert_hadatai(&mut vendor, &table()), 0);

        vendor.currency = Some("JPY".into());
        assert_eq!(convert_hadatai(&mut vendor, &table()), 1);
        assert_eq!(
            vendor.price_examples[0].price,
            PriceValue::Text("$10 USD (1000 JPY)".into())
        );
    }

    #[test]
    fn test_convert_maker() {
        let mut maker = Maker::from_raw(
            &json!({"name": "A", "startingPrice": "¥150,000", "currency": "JPY"}),
            "a",
        )
        .unwrap();
        assert!(convert_maker(&mut maker, &table()));
        assert_eq!(maker.starting_price_usd, Some(1500));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let tmp = TempDir::new().unwrap();
        let cache = LocalStorage::new(tmp.path());
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = config(&server.uri());
        write_json(&cache, &config.cache_file, &table()).await.unwrap();

        let client = Client::new();
        let (loaded, source) = RateLoader::new(&client, &cache, &config).load(today()).await;
        assert_eq!(source, RateSource::Cache);
        assert_eq!(loaded, table());
    }

    #[tokio::test]
    async fn test_remote_fetch_populates_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = LocalStorage::new(tmp.path());
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"date": "2026-01-01", "usd": {"jpy": 150.0}})),
            )
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let client = Client::new();
        let (loaded, source) = RateLoader::new(&client, &cache, &config).load(today()).await;

        assert_eq!(source, RateSource::Remote);
        assert_eq!(loaded.rate("JPY"), Some(150.0));

        let cached: ConversionTable = read_json(&cache, &config.cache_file).await.unwrap().unwrap();
        assert_eq!(cached, loaded);
    }

    #[tokio::test]
    async fn test_stale_cache_beats_fallback() {
        let tmp = TempDir::new().unwrap();
        let cache = LocalStorage::new(tmp.path());
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = config(&server.uri());
        write_json(&cache, &config.cache_file, &table()).await.unwrap();

        let client = Client::new();
        let later = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let (loaded, source) = RateLoader::new(&client, &cache, &config).load(later).await;
        assert_eq!(source, RateSource::StaleCache);
        assert_eq!(loaded, table());
    }

    #[tokio::test]
    async fn test_total_failure_uses_fallback() {
        let tmp = TempDir::new().unwrap();
        let cache = LocalStorage::new(tmp.path());
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let client = Client::new();
        let (loaded, source) = RateLoader::new(&client, &cache, &config).load(today()).await;
        assert_eq!(source, RateSource::Fallback);
        assert_eq!(loaded, ConversionTable::fallback());
    }
}
