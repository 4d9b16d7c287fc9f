// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load the configuration file strictly and check it for basic sanity.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    log::info!("Validating configuration {}", config_path.display());

    let config = Config::load(config_path)?;
    config.validate()?;

    log::info!("Configuration is valid");
    log::info!("  user agent: {}", config.http.user_agent);
    log::info!("  timeout: {}s", config.http.timeout_secs);
    log::info!("  request interval: {}ms", config.http.request_interval_ms);
    log::info!("  base currency: {}", config.currency.base);
    log::info!("  makers: {}", config.paths.makers_dir.display());
    log::info!("  hadatai: {}", config.paths.hadatai_dir.display());
    log::info!("  content: {}", config.paths.content_dir.display());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_valid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        std::fs::write(&path, "[http]\nrequest_interval_ms = 250\n").unwrap();
        let config = run_validate(&path).unwrap();
        assert_eq!(config.http.request_interval_ms, 250);
    }

    #[test]
    fn test_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(run_validate(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_invalid_values_fail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        std::fs::write(&path, "[http]\nuser_agent = \"  \"\n").unwrap();
        assert!(run_validate(&path).is_err());
    }
}
