use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, path::PathBuf, time::Duration};

use crate::{
    error::BotError,
    format::{CompassMode, FormatOptions, ZoneSetting},
    provider::LocationQuery,
    publisher::mastodon::Visibility,
};

pub const ENV_CITY: &str = "WEATHER_CITY";
pub const ENV_REGION: &str = "WEATHER_REGION";
pub const ENV_COUNTRY_CODE: &str = "WEATHER_COUNTRY_CODE";
pub const ENV_OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_MASTODON_SERVER: &str = "MASTODON_SERVER";
pub const ENV_MASTODON_CLIENT_KEY: &str = "MASTODON_CLIENT_KEY";
pub const ENV_MASTODON_CLIENT_SECRET: &str = "MASTODON_CLIENT_SECRET";
pub const ENV_MASTODON_ACCESS_TOKEN: &str = "MASTODON_ACCESS_TOKEN";
pub const ENV_INTERVAL_SECS: &str = "WEATHERBOT_INTERVAL_SECS";

const DEFAULT_INTERVAL_SECS: u64 = 60 * 60;
const DOTENV_FILE: &str = ".env";

/// `KEY=value` pairs from a dotenv file; a missing file yields nothing.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open env file: {}", path.display()))?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse env file: {}", path.display()))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    /// Overrides the public endpoint; mostly useful for testing.
    pub base_url: Option<String>,
}

/// Credentials for the posting account. Key and secret are carried for
/// completeness; posting itself only needs the access token.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MastodonConfig {
    pub server: String,
    pub client_key: String,
    pub client_secret: String,
    pub access_token: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub include_location: bool,
    pub hashtags: Vec<String>,
    pub zone_label: String,
    /// Minutes east of UTC; unset means the system's local time.
    pub utc_offset_minutes: Option<i32>,
    pub compass: CompassMode,
}

impl Default for StatusConfig {
    fn default() -> Self {
        let defaults = FormatOptions::default();
        Self {
            include_location: defaults.include_location,
            hashtags: defaults.hashtags,
            zone_label: defaults.zone_label,
            utc_offset_minutes: None,
            compass: defaults.compass,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    /// Stop at the first failed cycle instead of waiting for the next one.
    pub abort_on_error: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            abort_on_error: false,
        }
    }
}

/// Top-level configuration: a TOML file on disk, overridden by the environment.
///
/// Example TOML:
/// [location]
/// city = "Corner Brook"
/// region = "NL"
/// country_code = "CA"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub location: LocationQuery,
    pub openweather: OpenWeatherConfig,
    pub mastodon: MastodonConfig,
    pub status: StatusConfig,
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Config file (if any), then `./.env`, then the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(
            &Self::config_file_path()?,
            Some(Path::new(DOTENV_FILE)),
            |key| std::env::var(key).ok(),
        )
    }

    /// Values from `lookup` win over the env file, which wins over the TOML file.
    pub fn load_with<F>(config_path: &Path, env_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::load_from(config_path)?;
        let dotenv = match env_file {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };

        cfg.apply_env(|key| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| dotenv.get(key).cloned())
        })?;

        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
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

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "weatherbot", "weatherbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overwrite fields with any non-empty values `lookup` returns.
    pub fn apply_env<F>(&mut self, lookup: F) -> std::result::Result<(), BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let targets: [(&str, &mut String); 8] = [
            (ENV_CITY, &mut self.location.city),
            (ENV_REGION, &mut self.location.region),
            (ENV_COUNTRY_CODE, &mut self.location.country_code),
            (ENV_OPENWEATHER_API_KEY, &mut self.openweather.api_key),
            (ENV_MASTODON_SERVER, &mut self.mastodon.server),
            (ENV_MASTODON_CLIENT_KEY, &mut self.mastodon.client_key),
            (ENV_MASTODON_CLIENT_SECRET, &mut self.mastodon.client_secret),
            (ENV_MASTODON_ACCESS_TOKEN, &mut self.mastodon.access_token),
        ];

        for (key, field) in targets {
            if let Some(value) = get(key) {
                *field = value;
            }
        }

        if let Some(raw) = get(ENV_INTERVAL_SECS) {
            self.schedule.interval_secs = raw.trim().parse().map_err(|_| {
                BotError::Config(format!(
                    "{ENV_INTERVAL_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
        }

        Ok(())
    }

    /// Reports every missing value at once. Mastodon settings are only
    /// required when the bot will actually post.
    pub fn validate(&self, posting: bool) -> std::result::Result<(), BotError> {
        let mut missing = Vec::new();

        if self.location.city.trim().is_empty() {
            missing.push(ENV_CITY);
        }
        if self.location.country_code.trim().is_empty() {
            missing.push(ENV_COUNTRY_CODE);
        }
        if self.openweather.api_key.trim().is_empty() {
            missing.push(ENV_OPENWEATHER_API_KEY);
        }
        if posting {
            if self.mastodon.server.trim().is_empty() {
                missing.push(ENV_MASTODON_SERVER);
            }
            if self.mastodon.access_token.trim().is_empty() {
                missing.push(ENV_MASTODON_ACCESS_TOKEN);
            }
        }

        if !missing.is_empty() {
            return Err(BotError::Config(format!(
                "missing values: {}.\nHint: set them in the environment or run `weatherbot configure`.",
                missing.join(", ")
            )));
        }

        if self.schedule.interval_secs == 0 {
            return Err(BotError::Config("schedule.interval_secs must be greater than zero".into()));
        }

        self.format_options().map(|_| ())
    }

    pub fn format_options(&self) -> std::result::Result<FormatOptions, BotError> {
        let zone = match self.status.utc_offset_minutes {
            None => ZoneSetting::Local,
            Some(minutes) => {
                let offset = minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        BotError::Config(format!(
                            "status.utc_offset_minutes out of range: {minutes}"
                        ))
                    })?;
                ZoneSetting::Fixed(offset)
            }
        };

        Ok(FormatOptions {
            include_location: self.status.include_location,
            hashtags: self.status.hashtags.clone(),
            zone,
            zone_label: self.status.zone_label.clone(),
            compass: self.status.compass,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_secs)
    }
}
