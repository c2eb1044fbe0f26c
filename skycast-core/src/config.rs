use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{cache::DEFAULT_TTL, provider::ProviderId, units::UnitSystem};

const CONFIG_FILE: &str = "config.toml";

/// Credentials for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// User settings persisted as TOML:
///
/// ```toml
/// default_provider = "weatherapi"
/// units = "metric"
/// cache_ttl_secs = 600
///
/// [providers.weatherapi]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider used when the command line names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<ProviderId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitSystem>,

    /// Lifetime of cached provider payloads, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,

    #[serde(default)]
    pub providers: BTreeMap<ProviderId, ProviderConfig>,
}

impl Config {
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        self.default_provider.ok_or_else(|| {
            anyhow!(
                "No default provider configured.\n\
                 Hint: run `skycast configure <provider>` \
                 (e.g. `skycast configure weatherapi`) first."
            )
        })
    }

    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id);
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(&id)
    }

    pub fn provider_api_key(&self, id: ProviderId) -> Option<&str> {
        self.provider_config(id).map(|p| p.api_key.as_str())
    }

    pub fn is_provider_configured(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    /// Store (or replace) the key for `id`. The first provider configured
    /// becomes the default; later ones leave the default alone.
    pub fn upsert_provider_api_key(&mut self, id: ProviderId, api_key: String) {
        self.providers.insert(id, ProviderConfig { api_key });
        self.default_provider.get_or_insert(id);
    }

    pub fn units(&self) -> UnitSystem {
        self.units.unwrap_or_default()
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_secs.map_or(DEFAULT_TTL, Duration::from_secs)
    }

    /// Read the user's config file. A missing file is a first run and yields
    /// the empty default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write to the user's config file and return where it went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "skycast", "skycast")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}
