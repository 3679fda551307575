use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    display::region_from_locale,
    location::DEFAULT_IP_LOOKUP_URL,
    model::{Coordinates, UnitSystem},
    provider::openweather::DEFAULT_BASE_URL,
};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "LOCALWEATHER_API_KEY";

/// Stored answer to "may we look up your approximate location?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationConsent {
    Granted,
    Denied,
    /// Denied and never ask again.
    Never,
}

/// Where the location fix comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Whether the IP lookup location service is switched on.
    pub ip_lookup: bool,
    pub ip_lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            ip_lookup: true,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

impl LocationConfig {
    /// Fixed coordinates, when both are configured.
    pub fn fixed(&self) -> Result<Option<Coordinates>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok(Some(
                Coordinates::new(lat, lon).context("Invalid coordinates in config")?,
            )),
            (None, None) => Ok(None),
            _ => Err(anyhow!(
                "Config sets only one of location.latitude / location.longitude; set both or neither."
            )),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: UnitSystem,
    /// Region code used for the temperature suffix, e.g. "US". Falls back to the locale.
    pub region: Option<String>,
    pub request_timeout_secs: u64,
    pub fix_timeout_secs: u64,
    pub location_consent: Option<LocationConsent>,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: UnitSystem::Metric,
            region: None,
            request_timeout_secs: 15,
            fix_timeout_secs: 30,
            location_consent: None,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Save config, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
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
        let dirs = ProjectDirs::from("dev", "localweather", "localweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, else from the file.
    pub fn resolved_api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.api_key_with_override(from_env.as_deref())
    }

    fn api_key_with_override(&self, env_value: Option<&str>) -> Result<String> {
        let non_blank = |k: &str| {
            let k = k.trim();
            (!k.is_empty()).then(|| k.to_string())
        };

        env_value
            .and_then(non_blank)
            .or_else(|| self.api_key.as_deref().and_then(non_blank))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `localweather configure` or set {API_KEY_ENV}."
                )
            })
    }

    /// Configured region, else the one derived from the locale environment.
    pub fn locale_region(&self) -> String {
        if let Some(region) = self.region.as_deref().filter(|r| !r.trim().is_empty()) {
            return region.trim().to_ascii_uppercase();
        }

        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .and_then(|v| region_from_locale(&v))
            .unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fix_timeout(&self) -> Duration {
        Duration::from_secs(self.fix_timeout_secs)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.units, UnitSystem::Metric);
        assert_eq!(cfg.fix_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("  OPEN_KEY ".into());
        cfg.units = UnitSystem::Imperial;
        cfg.region = Some("US".into());
        cfg.location_consent = Some(LocationConsent::Never);
        cfg.location.latitude = Some(40.7);
        cfg.location.longitude = Some(-74.0);

        cfg.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
        assert_eq!(loaded.api_key.as_deref(), Some("OPEN_KEY"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = \"standard\"\n[location]\nip_lookup = false\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.units, UnitSystem::Standard);
        assert!(!cfg.location.ip_lookup);
        assert_eq!(cfg.location.ip_lookup_url, DEFAULT_IP_LOOKUP_URL);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn api_key_resolution() {
        let mut cfg = Config::default();
        let err = cfg.api_key_with_override(None).unwrap_err();
        assert!(err.to_string().contains("Hint: run `localweather configure`"));

        cfg.set_api_key("FILE".into());
        assert_eq!(cfg.api_key_with_override(None).expect("key"), "FILE");
        assert_eq!(cfg.api_key_with_override(Some("ENV")).expect("key"), "ENV");
        assert_eq!(cfg.api_key_with_override(Some(" ")).expect("key"), "FILE");
    }

    #[test]
    fn configured_region_wins() {
        let cfg = Config { region: Some("lr".into()), ..Config::default() };
        assert_eq!(cfg.locale_region(), "LR");
    }

    #[test]
    fn fixed_location_requires_both_coordinates() {
        let mut loc = LocationConfig::default();
        assert_eq!(loc.fixed().expect("none"), None);

        loc.latitude = Some(10.0);
        assert!(loc.fixed().is_err());

        loc.longitude = Some(20.0);
        let fix = loc.fixed().expect("valid").expect("some");
        assert_eq!(fix.latitude(), 10.0);

        loc.latitude = Some(100.0);
        assert!(loc.fixed().is_err());
    }
}
