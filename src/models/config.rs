//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client and request pacing settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Exchange-rate table settings
    #[serde(default)]
    pub currency: CurrencyConfig,

    /// Embed resolution endpoints
    #[serde(default)]
    pub embeds: EmbedConfig,

    /// Site metadata used by the plain-text export
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.task_timeout_secs == Some(0) {
            return Err(AppError::validation("http.task_timeout_secs must be > 0"));
        }
        if self.currency.base.trim().is_empty() {
            return Err(AppError::validation("currency.base is empty"));
        }
        if self.currency.cache_file.trim().is_empty() {
            return Err(AppError::validation("currency.cache_file is empty"));
        }
        for (key, path) in self.paths.entries() {
            if path.as_os_str().is_empty() {
                return Err(AppError::validation(format!("paths.{key} is empty")));
            }
        }
        Ok(())
    }
}

/// HTTP client and request pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum interval between the start of two queued requests
    #[serde(default = "defaults::request_interval")]
    pub request_interval_ms: u64,

    /// Upper bound for a single queued task, unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_interval_ms: defaults::request_interval(),
            task_timeout_secs: None,
        }
    }
}

/// Input and output locations, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of maker `*.json` records
    pub makers_dir: PathBuf,
    /// Directory of hadatai `*.json` records
    pub hadatai_dir: PathBuf,
    /// Markdown content root
    pub content_dir: PathBuf,
    /// JSON artifacts for static consumption
    pub data_output_dir: PathBuf,
    /// Importable module declarations
    pub module_output_dir: PathBuf,
    /// Rendered content fragments
    pub html_output_dir: PathBuf,
    /// Plain-text exports (`llms.txt`, `llms-full.txt`)
    pub export_dir: PathBuf,
    /// Exchange-rate cache location
    pub cache_dir: PathBuf,
}

impl PathsConfig {
    fn entries(&self) -> [(&'static str, &PathBuf); 8] {
        [
            ("makers_dir", &self.makers_dir),
            ("hadatai_dir", &self.hadatai_dir),
            ("content_dir", &self.content_dir),
            ("data_output_dir", &self.data_output_dir),
            ("module_output_dir", &self.module_output_dir),
            ("html_output_dir", &self.html_output_dir),
            ("export_dir", &self.export_dir),
            ("cache_dir", &self.cache_dir),
        ]
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            makers_dir: "data/makers".into(),
            hadatai_dir: "data/hadatai".into(),
            content_dir: "docs".into(),
            data_output_dir: "static/data".into(),
            module_output_dir: "src/data".into(),
            html_output_dir: "build/content".into(),
            export_dir: "static".into(),
            cache_dir: ".cache".into(),
        }
    }
}

/// Exchange-rate table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Base currency every price is converted into
    #[serde(default = "defaults::base_currency")]
    pub base: String,

    /// Remote feed URL returning `{date, <base>: {code: rate}}`
    #[serde(default = "defaults::feed_url")]
    pub feed_url: String,

    /// Cache file name inside `paths.cache_dir`
    #[serde(default = "defaults::cache_file")]
    pub cache_file: String,

    /// Cached tables older than this many days are refreshed
    #[serde(default = "defaults::max_age_days")]
    pub max_age_days: i64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base: defaults::base_currency(),
            feed_url: defaults::feed_url(),
            cache_file: defaults::cache_file(),
            max_age_days: defaults::max_age_days(),
        }
    }
}

/// Embed resolution endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Handle to DID lookup endpoint
    #[serde(default = "defaults::bluesky_resolve_url")]
    pub bluesky_resolve_url: String,

    /// oEmbed endpoint for TikTok posts
    #[serde(default = "defaults::tiktok_oembed_url")]
    pub tiktok_oembed_url: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            bluesky_resolve_url: defaults::bluesky_resolve_url(),
            tiktok_oembed_url: defaults::tiktok_oembed_url(),
        }
    }
}

/// Site metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "defaults::site_title")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Absolute URL prefix for document links in `llms.txt`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: defaults::site_title(),
            description: String::new(),
            base_url: defaults::base_url(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; kigu-directory/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_interval() -> u64 {
        100
    }

    // Currency defaults
    pub fn base_currency() -> String {
        "usd".into()
    }
    pub fn feed_url() -> String {
        "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/usd.json"
            .into()
    }
    pub fn cache_file() -> String {
        "exchange-rates.json".into()
    }
    pub fn max_age_days() -> i64 {
        1
    }

    // Embed defaults
    pub fn bluesky_resolve_url() -> String {
        "https://bsky.social/xrpc/com.atproto.identity.resolveHandle".into()
    }
    pub fn tiktok_oembed_url() -> String {
        "https://www.tiktok.com/oembed".into()
    }

    // Site defaults
    pub fn site_title() -> String {
        "Kigurumi Maker Directory".into()
    }
    pub fn base_url() -> String {
        "https://example.org".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [http]
            request_interval_ms = 250

            [paths]
            makers_dir = "records/makers"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.request_interval(), Duration::from_millis(250));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.paths.makers_dir, PathBuf::from("records/makers"));
        assert_eq!(config.paths.hadatai_dir, PathBuf::from("data/hadatai"));
        assert_eq!(config.currency.base, "usd");
    }

    #[test]
    fn test_validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".into();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_task_timeout() {
        let mut config = Config::default();
        config.http.task_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/site.toml");
        assert_eq!(config.http.request_interval_ms, 100);
    }
}
