//! Runtime settings.
//!
//! Values come from command-line flags (which also cover the `ORS_API_KEY`
//! environment variable), then an optional TOML file, then built-in defaults.

use crate::error::ConfigError;
use drivetime_router::client::DEFAULT_BASE_URL;
use drivetime_router::{ApiKey, OpenRouteServiceClient, RateLimitPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 300;
pub const DEFAULT_MINUTES: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/drivetime/config.toml";

pub fn validate_minutes(minutes: u32) -> Result<u32, ConfigError> {
    if (MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(ConfigError::DurationOutOfRange {
            value: minutes,
            min: MIN_MINUTES,
            max: MAX_MINUTES,
        })
    }
}

/// Expands a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Contents of the optional config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub default_minutes: Option<u32>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_refill_ms")]
    pub refill_ms: u64,
}

fn default_capacity() -> u32 {
    1
}

fn default_refill_ms() -> u64 {
    1000
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Reads the file if it exists; a missing file yields an empty config.
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            debug!("Reading config from {}", path.display());
            Self::from_file(path)
        } else {
            debug!("No config file at {}", path.display());
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Values given on the command line; `None` defers to the file or defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub minutes: Option<u32>,
    pub rate_limit_capacity: Option<u32>,
    pub rate_limit_refill_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub duration_minutes: u32,
    pub rate_limit: RateLimitPolicy,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let api_key = overrides
            .api_key
            .and_then(ApiKey::new)
            .or_else(|| file.api_key.and_then(ApiKey::new));

        let duration_minutes = validate_minutes(
            overrides
                .minutes
                .or(file.default_minutes)
                .unwrap_or(DEFAULT_MINUTES),
        )?;

        let file_limit = file.rate_limit.unwrap_or(RateLimitSettings {
            capacity: default_capacity(),
            refill_ms: default_refill_ms(),
        });
        let rate_limit = RateLimitPolicy::new(
            overrides.rate_limit_capacity.unwrap_or(file_limit.capacity),
            Duration::from_millis(overrides.rate_limit_refill_ms.unwrap_or(file_limit.refill_ms)),
        );

        Ok(Self {
            api_key,
            base_url: overrides
                .base_url
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: overrides
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            duration_minutes,
            rate_limit,
        })
    }

    /// Fails before any data is touched when no credential is configured.
    pub fn require_api_key(&self) -> Result<&ApiKey, ConfigError> {
        self.api_key.as_ref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn build_client(&self) -> Result<OpenRouteServiceClient, ConfigError> {
        let key = self.require_api_key()?.clone();
        OpenRouteServiceClient::with_timeout(key, self.timeout_secs)
            .and_then(|client| client.with_base_url(&self.base_url))
            .map_err(|e| ConfigError::Provider(e.to_string()))
    }
}
