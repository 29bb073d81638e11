// src/utils/config.rs
// Environment-driven configuration for the enrichment pipeline. Policy
// constants (fuzzy threshold, rate-limit window) are deliberately
// configurable rather than hard-coded.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use crate::matching::commitments::DEFAULT_FUZZY_SCORE_THRESHOLD;

const DEFAULT_RESOLVE_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;
const DEFAULT_PROFILE_TTL_MS: u64 = 30 * 24 * 60 * 60 * 1000;
const DEFAULT_CACHE_MAX: usize = 500;
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;
const DEFAULT_RATE_LIMIT_MAX: u32 = 60;

const DEFAULT_SBTI_RECORDS_PATH: &str = "data/sbti/sbti_records.json";
const DEFAULT_SBTI_INDEX_PATH: &str = "data/sbti/sbti_name_index.json";
const DEFAULT_INTENSITY_MAP_PATH: &str = "data/ons/ons_intensity_map.json";

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub register_api_key: Option<String>,
    pub register_base_url: Option<String>,
    pub resolve_ttl: Duration,
    pub profile_ttl: Duration,
    pub cache_max: usize,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub fuzzy_threshold: u32,
    pub sbti_records_path: PathBuf,
    pub sbti_index_path: PathBuf,
    pub intensity_map_path: PathBuf,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            register_api_key: None,
            register_base_url: None,
            resolve_ttl: Duration::from_millis(DEFAULT_RESOLVE_TTL_MS),
            profile_ttl: Duration::from_millis(DEFAULT_PROFILE_TTL_MS),
            cache_max: DEFAULT_CACHE_MAX,
            rate_limit_window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            fuzzy_threshold: DEFAULT_FUZZY_SCORE_THRESHOLD,
            sbti_records_path: PathBuf::from(DEFAULT_SBTI_RECORDS_PATH),
            sbti_index_path: PathBuf::from(DEFAULT_SBTI_INDEX_PATH),
            intensity_map_path: PathBuf::from(DEFAULT_INTENSITY_MAP_PATH),
        }
    }
}

impl EnrichmentConfig {
    /// Create configuration from environment variables, falling back to the
    /// service defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            register_api_key: env::var("COMPANIES_HOUSE_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            register_base_url: env::var("COMPANIES_HOUSE_BASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            resolve_ttl: Duration::from_millis(env_parse(
                "EMPLOYER_RESOLVE_TTL_MS",
                DEFAULT_RESOLVE_TTL_MS,
            )),
            profile_ttl: Duration::from_millis(env_parse(
                "EMPLOYER_PROFILE_TTL_MS",
                DEFAULT_PROFILE_TTL_MS,
            )),
            cache_max: env_parse("EMPLOYER_CACHE_MAX", DEFAULT_CACHE_MAX),
            rate_limit_window: Duration::from_millis(env_parse(
                "RATE_LIMIT_WINDOW_MS",
                DEFAULT_RATE_LIMIT_WINDOW_MS,
            )),
            rate_limit_max: env_parse("RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX),
            fuzzy_threshold: env_parse("FUZZY_SCORE_THRESHOLD", DEFAULT_FUZZY_SCORE_THRESHOLD),
            sbti_records_path: env_path("SBTI_RECORDS_PATH", DEFAULT_SBTI_RECORDS_PATH),
            sbti_index_path: env_path("SBTI_INDEX_PATH", DEFAULT_SBTI_INDEX_PATH),
            intensity_map_path: env_path("ONS_INTENSITY_MAP_PATH", DEFAULT_INTENSITY_MAP_PATH),
        }
    }

    /// The register credential is the one piece of configuration the
    /// pipeline cannot degrade without.
    pub fn require_register_api_key(&self) -> Result<&str> {
        self.register_api_key
            .as_deref()
            .context("COMPANIES_HOUSE_API_KEY is not set")
    }

    pub fn log_config(&self) {
        info!(
            "Enrichment config: resolve TTL {:?}, profile TTL {:?}, cache max {}, rate limit {}/{:?}, fuzzy threshold {}",
            self.resolve_ttl,
            self.profile_ttl,
            self.cache_max,
            self.rate_limit_max,
            self.rate_limit_window,
            self.fuzzy_threshold
        );
        info!(
            "Reference data: sbti records {}, sbti index {}, intensity map {}",
            self.sbti_records_path.display(),
            self.sbti_index_path.display(),
            self.intensity_map_path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_policy() {
        let config = EnrichmentConfig::default();
        assert_eq!(config.cache_max, 500);
        assert_eq!(config.rate_limit_max, 60);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.fuzzy_threshold, 95);
        assert_eq!(config.resolve_ttl, Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let config = EnrichmentConfig::default();
        assert!(config.require_register_api_key().is_err());

        let config = EnrichmentConfig {
            register_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert_eq!(config.require_register_api_key().unwrap(), "key");
    }
}
