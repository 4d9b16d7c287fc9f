// src/pipeline/data.rs

//! Directory data pipeline: load, convert, and publish the maker and
//! hadatai collections.

use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Config, ConversionTable, Hadatai, Maker, RateSource};
use crate::services::{RateLoader, convert_hadatai, convert_maker};
use crate::storage::{ArtifactStorage, LocalStorage};
use crate::utils::http::create_client;

use super::directory::load_directory;

pub const MAKERS_ARTIFACT: &str = "makers";
pub const HADATAI_ARTIFACT: &str = "hadatai";

/// Normalized collections produced by one data run.
#[derive(Debug, Default)]
pub struct DirectoryData {
    pub makers: Vec<Maker>,
    pub hadatai: Vec<Hadatai>,
    /// Files skipped across both directories
    pub skipped: usize,
    /// Prices rewritten in the base currency
    pub converted: usize,
}

/// Run the pipeline with a fresh HTTP client and today's date.
pub async fn run_data(config: &Config) -> Result<DirectoryData> {
    let client = create_client(&config.http)?;
    let today = Utc::now().date_naive();
    let (table, _) = load_rates(config, &client, today).await;

    let data = build_directory(config, &table).await?;
    write_artifacts(config, &data).await?;
    Ok(data)
}

/// Resolve the conversion table through the configured cache.
pub async fn load_rates(
    config: &Config,
    client: &Client,
    today: NaiveDate,
) -> (ConversionTable, RateSource) {
    let cache = LocalStorage::new(&config.paths.cache_dir);
    RateLoader::new(client, &cache, &config.currency)
        .load(today)
        .await
}

/// Load both directories and convert prices with `table`.
pub async fn build_directory(config: &Config, table: &ConversionTable) -> Result<DirectoryData> {
    let makers = load_directory::<Maker>(&config.paths.makers_dir).await?;
    let hadatai = load_directory::<Hadatai>(&config.paths.hadatai_dir).await?;

    let mut data = DirectoryData {
        skipped: makers.failures.len() + hadatai.failures.len(),
        makers: makers.records,
        hadatai: hadatai.records,
        converted: 0,
    };

    for maker in &mut data.makers {
        if convert_maker(maker, table) {
            data.converted += 1;
        }
    }
    for vendor in &mut data.hadatai {
        data.converted += convert_hadatai(vendor, table);
    }

    log::info!(
        "Directory: {} maker(s), {} hadatai, {} price(s) converted, {} file(s) skipped",
        data.makers.len(),
        data.hadatai.len(),
        data.converted,
        data.skipped
    );
    Ok(data)
}

/// Write the JSON artifacts and their importable module counterparts.
pub async fn write_artifacts(config: &Config, data: &DirectoryData) -> Result<()> {
    let json_out = LocalStorage::new(&config.paths.data_output_dir);
    let module_out = LocalStorage::new(&config.paths.module_output_dir);

    publish(&json_out, &module_out, MAKERS_ARTIFACT, &data.makers).await?;
    publish(&json_out, &module_out, HADATAI_ARTIFACT, &data.hadatai).await?;
    Ok(())
}

/// Serialize once and write the same text as `<name>.json` and
/// `<name>.js`.
pub async fn publish<T: Serialize + ?Sized>(
    json_out: &dyn ArtifactStorage,
    module_out: &dyn ArtifactStorage,
    name: &str,
    records: &T,
) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    let module = module_source(&json);

    let json_key = format!("{name}.json");
    let module_key = format!("{name}.js");
    json_out.write_bytes(&json_key, json.as_bytes()).await?;
    module_out.write_bytes(&module_key, module.as_bytes()).await?;

    log::info!(
        "Wrote {} and {}",
        json_out.location(&json_key),
        module_out.location(&module_key)
    );
    Ok(())
}

/// Wrap serialized JSON as a default-exported module.
pub fn module_source(json: &str) -> String {
    format!("export default {json};\n")
}

/// Recover the JSON payload of a generated module.
pub fn module_payload(source: &str) -> Option<&str> {
    source
        .trim_end()
        .strip_prefix("export default ")?
        .strip_suffix(';')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceValue;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_in(root: &Path) -> Config {
        let mut config = Config::default();
        config.paths.makers_dir = root.join("makers");
        config.paths.hadatai_dir = root.join("hadatai");
        config.paths.data_output_dir = root.join("static/data");
        config.paths.module_output_dir = root.join("src/data");
        config.paths.cache_dir = root.join(".cache");
        config
    }

    fn table() -> ConversionTable {
        ConversionTable {
            date: "2026-01-01".into(),
            base: "usd".into(),
            rates: [("jpy".to_string(), 100.0)].into(),
        }
    }

    #[tokio::test]
    async fn test_build_directory_converts_prices() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        std::fs::create_dir_all(&config.paths.hadatai_dir).unwrap();
        std::fs::write(
            config.paths.hadatai_dir.join("v.json"),
            r#"{"name": "V", "currency": "jpy", "priceExamples": [{"type": "Suit", "price": "¥5,000"}, {"type": "Custom", "price": "Varies"}]}"#,
        )
        .unwrap();

        let data = build_directory(&config, &table()).await.unwrap();
        assert!(data.makers.is_empty());
        assert_eq!(data.converted, 1);
        assert_eq!(
            data.hadatai[0].price_examples[0].price,
            PriceValue::Text("$50 USD (¥5,000 JPY)".into())
        );
        assert_eq!(data.hadatai[0].price_examples[1].price, PriceValue::Text("Varies".into()));
    }

    #[tokio::test]
    async fn test_artifacts_hold_identical_data() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        std::fs::create_dir_all(&config.paths.makers_dir).unwrap();
        std::fs::write(
            config.paths.makers_dir.join("m.json"),
            r#"{"name": "M", "Region": "Tokyo", "features": {"Blinking": true}}"#,
        )
        .unwrap();

        let data = build_directory(&config, &table()).await.unwrap();
        write_artifacts(&config, &data).await.unwrap();

        let json = std::fs::read_to_string(config.paths.data_output_dir.join("makers.json")).unwrap();
        let module = std::fs::read_to_string(config.paths.module_output_dir.join("makers.js")).unwrap();
        assert_eq!(module_payload(&module), Some(json.as_str()));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["region"], "Tokyo");
        assert!(config.paths.data_output_dir.join("hadatai.json").exists());
    }

    #[test]
    fn test_module_source_round_trips_payload() {
        let source = module_source("[]");
        assert_eq!(source, "export default [];\n");
        assert_eq!(module_payload(&source), Some("[]"));
        assert_eq!(module_payload("const x = 1;"), None);
    }
}
