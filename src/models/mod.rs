// src/models/mod.rs

//! Domain models for the site build.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod currency;
mod hadatai;
mod maker;
mod platform;
mod price;
mod raw;

// Re-export all public types
pub use config::{
    Config, CurrencyConfig, EmbedConfig, HttpConfig, PathsConfig, SiteConfig,
};
pub use currency::{ConversionTable, RateSource};
pub use hadatai::{Hadatai, infer_english_ordering};
pub use maker::{EnglishOrdering, Maker, MakerStatus, UNKNOWN_NAME};
pub use platform::{Platform, SocialLink, social_links};
pub use price::{PriceExample, PriceValue};
pub use raw::RawRecord;

/// A record type that can be built from one raw JSON file.
pub trait Record: Sized {
    /// Label used in logs, e.g. "maker".
    const KIND: &'static str;

    /// Normalize a raw value; `source` names the file in errors.
    fn from_raw(value: &serde_json::Value, source: &str) -> crate::error::Result<Self>;

    fn name(&self) -> &str;
}

impl Record for Maker {
    const KIND: &'static str = "maker";

    fn from_raw(value: &serde_json::Value, source: &str) -> crate::error::Result<Self> {
        Maker::from_raw(value, source)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Record for Hadatai {
    const KIND: &'static str = "hadatai";

    fn from_raw(value: &serde_json::Value, source: &str) -> crate::error::Result<Self> {
        Hadatai::from_raw(value, source)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
