use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::severity::Region;

pub const WEATHER_KEY_VAR: &str = "WEATHERAPI_KEY";
pub const GEOCODER_KEY_VAR: &str = "OPENCAGE_KEY";

/// A storm search radius must be a positive number of kilometres.
pub fn check_radius(radius_km: f64) -> Result<f64, String> {
    if radius_km.is_nan() || radius_km <= 0.0 {
        return Err(format!("radius must be positive, got {radius_km}"));
    }
    Ok(radius_km)
}

/// Settings read from `config.json`. Every field has a default so a partial
/// file (or none at all) is accepted.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// WeatherAPI.com key.
    pub api_key: String,
    /// WeatherAPI.com base URL; `forecast.json` is appended.
    pub url: String,
    pub open_cage_api_key: String,
    pub open_cage_url: String,
    /// Location used when none is given and nothing was used before.
    pub address: Option<String>,
    pub region: Region,
    pub refresh_secs: u64,
    /// Search radii for nearby storms, cycled by the dashboard.
    pub radii_km: Vec<f64>,
    pub address_log: PathBuf,
    pub temp_log: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: "http://api.weatherapi.com/v1".to_string(),
            open_cage_api_key: String::new(),
            open_cage_url: "https://api.opencagedata.com/geocode/v1/json".to_string(),
            address: None,
            region: Region::Default,
            refresh_secs: 30,
            radii_km: vec![500.0, 1000.0, 1500.0, 2000.0],
            address_log: PathBuf::from("address.log"),
            temp_log: PathBuf::from("temp.log"),
            log_file: None,
        }
    }
}

impl Config {
    /// Reads the config file, falling back to defaults when it does not exist,
    /// then applies key overrides from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            Self::from_json(&text).with_context(|| format!("parsing JSON in {}", path.display()))?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        Ok(config.with_overrides(
            std::env::var(WEATHER_KEY_VAR).ok(),
            std::env::var(GEOCODER_KEY_VAR).ok(),
        ))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        if config.refresh_secs == 0 {
            anyhow::bail!("refresh_secs must be at least 1");
        }
        for radius in &config.radii_km {
            check_radius(*radius).map_err(|err| anyhow::anyhow!("radii_km: {err}"))?;
        }
        Ok(config)
    }

    pub fn with_overrides(mut self, api_key: Option<String>, open_cage_api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            self.api_key = key;
        }
        if let Some(key) = open_cage_api_key.filter(|key| !key.is_empty()) {
            self.open_cage_api_key = key;
        }
        self
    }

    /// Fails early when a service key is missing.
    pub fn require_keys(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!("Weather API key is missing (set api_key or {WEATHER_KEY_VAR})");
        }
        if self.open_cage_api_key.is_empty() {
            anyhow::bail!("OpenCage API key is missing (set open_cage_api_key or {GEOCODER_KEY_VAR})");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_json(
            r#"{"api_key": "abc", "address": "Quezon City", "region": "tropical", "radii_km": [250]}"#,
        )
        .unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.address.as_deref(), Some("Quezon City"));
        assert_eq!(config.region, Region::Tropical);
        assert_eq!(config.radii_km, vec![250.0]);
        assert_eq!(config.refresh_secs, 30);
        assert_eq!(config.url, "http://api.weatherapi.com/v1");
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_json(r#"{"refresh_secs": 0}"#).is_err());
        assert!(Config::from_json(r#"{"radii_km": [500, -1]}"#).is_err());
        assert!(Config::from_json(r#"{"region": "lunar"}"#).is_err());
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_json(r#"{"api_key": "file"}"#)
            .unwrap()
            .with_overrides(Some("env".to_string()), Some(String::new()));
        assert_eq!(config.api_key, "env");
        assert_eq!(config.open_cage_api_key, "");
        assert!(config.require_keys().is_err());

        let config = config.with_overrides(None, Some("geo".to_string()));
        assert_eq!(config.api_key, "env");
        assert!(config.require_keys().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.refresh_secs, 30);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"refresh_secs": 60, "log_file": "wx.log"}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.refresh_secs, 60);
        assert_eq!(config.log_file, Some(PathBuf::from("wx.log")));
    }
}
