use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{geocode::GeocoderId, provider::ProviderId, resolver::RegionFilter};

/// Geocoding result cap used when the config does not set one.
pub const DEFAULT_GEOCODING_LIMIT: u8 = 5;
const MAX_GEOCODING_LIMIT: u8 = 100;

/// Configuration for a single provider (API key, endpoint override).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's public endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Maximum number of candidates requested from the geocoder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Optional restriction of geocoding results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Country name or ISO code, e.g. "IN" or "India".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Weather provider id, e.g. "openmeteo", "openweather" or "weatherapi".
    pub default_provider: Option<String>,

    /// Geocoder id, "openmeteo" or "openweather".
    pub default_geocoder: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    ///
    /// Falls back to the keyless Open-Meteo provider when nothing is configured.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::OpenMeteo),
        }
    }

    pub fn default_geocoder_id(&self) -> Result<GeocoderId> {
        match self.default_geocoder.as_deref() {
            Some(s) => GeocoderId::try_from(s),
            None => Ok(GeocoderId::OpenMeteo),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn set_default_geocoder(&mut self, id: GeocoderId) {
        self.default_geocoder = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; the first keyed provider also becomes the default.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.provider_entry(provider_id).api_key = Some(api_key);

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    pub fn set_provider_base_url(&mut self, provider_id: ProviderId, base_url: Option<String>) {
        self.provider_entry(provider_id).base_url = base_url;
    }

    fn provider_entry(&mut self, provider_id: ProviderId) -> &mut ProviderConfig {
        self.providers
            .entry(provider_id.as_str().to_string())
            .or_default()
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.api_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }

    /// Geocoding result cap, clamped to 1..=100.
    pub fn geocoding_limit(&self) -> u8 {
        self.geocoding
            .limit
            .unwrap_or(DEFAULT_GEOCODING_LIMIT)
            .clamp(1, MAX_GEOCODING_LIMIT)
    }

    /// The configured filter, or `None` when neither country nor region is set.
    pub fn region_filter(&self) -> Option<RegionFilter> {
        RegionFilter::new(self.filter.country.clone(), self.filter.region.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn default_provider_falls_back_to_open_meteo() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenMeteo);
        assert_eq!(cfg.default_geocoder_id().unwrap(), GeocoderId::OpenMeteo);
    }

    #[test]
    fn unknown_default_provider_is_an_error() {
        let cfg = Config {
            default_provider: Some("nope".into()),
            ..Config::default()
        };
        let err = cfg.default_provider_id().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn set_api_key_and_default_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::OpenWeather);

        let key = cfg.provider_api_key(ProviderId::OpenWeather);
        assert_eq!(key, Some("OPEN_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
        assert!(!cfg.is_provider_configured(ProviderId::WeatherApi));
        assert!(cfg.is_provider_configured(ProviderId::OpenMeteo));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WEATHER_KEY".into());

        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::OpenWeather);

        cfg.set_default_provider(ProviderId::WeatherApi);
        let default = cfg.default_provider_id().expect("default provider must exist");
        assert_eq!(default, ProviderId::WeatherApi);
    }

    #[test]
    fn upsert_keeps_base_url() {
        let mut cfg = Config::default();
        cfg.set_provider_base_url(ProviderId::OpenWeather, Some("http://proxy".into()));
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".into());

        assert_eq!(cfg.provider_base_url(ProviderId::OpenWeather), Some("http://proxy"));
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("KEY"));
    }

    #[test]
    fn geocoding_limit_is_clamped() {
        let mut cfg = Config::default();
        assert_eq!(cfg.geocoding_limit(), DEFAULT_GEOCODING_LIMIT);

        cfg.geocoding.limit = Some(0);
        assert_eq!(cfg.geocoding_limit(), 1);

        cfg.geocoding.limit = Some(250);
        assert_eq!(cfg.geocoding_limit(), 100);
    }

    #[test]
    fn empty_filter_means_no_filter() {
        let mut cfg = Config::default();
        assert!(cfg.region_filter().is_none());

        cfg.filter.country = Some("IN".into());
        assert!(cfg.region_filter().is_some());
    }

    #[test]
    fn save_and_load_round_trip_through_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WA_KEY".into());
        cfg.set_default_geocoder(GeocoderId::OpenWeather);
        cfg.geocoding.limit = Some(3);
        cfg.filter.country = Some("IN".into());
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.default_provider_id().unwrap(), ProviderId::WeatherApi);
        assert_eq!(loaded.default_geocoder_id().unwrap(), GeocoderId::OpenWeather);
        assert_eq!(loaded.provider_api_key(ProviderId::WeatherApi), Some("WA_KEY"));
        assert_eq!(loaded.geocoding_limit(), 3);
        assert_eq!(loaded.filter.country.as_deref(), Some("IN"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert!(cfg.providers.is_empty());
        assert!(cfg.default_provider.is_none());
    }

    #[test]
    fn minimal_toml_parses() {
        let cfg: Config = toml::from_str(
            r#"
            default_provider = "openweather"

            [providers.openweather]
            api_key = "abc"
            "#,
        )
        .expect("parse");

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("abc"));
        assert_eq!(cfg.geocoding_limit(), DEFAULT_GEOCODING_LIMIT);
    }
}
