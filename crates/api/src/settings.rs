//! Service Configuration
//!
//! Layered: built-in defaults, then an optional config file, then
//! `PRICER__*` environment variables (`PRICER__RATE_LIMIT__BURST_SIZE=10`).

use crate::rate_limit::RateLimitConfig;
use crate::ApiError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Config file used when `PRICER_CONFIG` is unset (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "config/pricer";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub artifact_path: PathBuf,
    pub log_json: bool,
    pub rate_limit: RateLimitConfig,
}

impl ServiceConfig {
    /// Load from `PRICER_CONFIG` (or the default file) plus environment
    pub fn load() -> Result<Self, ApiError> {
        let file = std::env::var("PRICER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_file(&file)
    }

    /// Load with `file` as the config file layer; a missing file is not an error
    pub fn from_file(file: &str) -> Result<Self, ApiError> {
        let defaults = RateLimitConfig::default();

        let settings = Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("artifact_path", "artifacts/cardekho_bundle.json")?
            .set_default("log_json", false)?
            .set_default("rate_limit.per_second", defaults.per_second as i64)?
            .set_default("rate_limit.burst_size", defaults.burst_size as i64)?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("PRICER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = ServiceConfig::from_file("/nonexistent/pricer").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.artifact_path, PathBuf::from("artifacts/cardekho_bundle.json"));
        assert!(!config.log_json);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricer.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "bind_addr = \"127.0.0.1:9000\"\nlog_json = true\n\n[rate_limit]\nburst_size = 20"
        )
        .unwrap();

        let config = ServiceConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert!(config.log_json);
        assert_eq!(config.rate_limit.burst_size, 20);
        assert_eq!(config.rate_limit.per_second, 2);
    }
}
