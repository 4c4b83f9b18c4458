//! Client configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::services::scheduler::SchedulerSettings;

/// Default location on disk where the client looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/client.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIE_QUIZ_CONFIG_PATH";
/// Environment variable overriding the service base URL.
const BASE_URL_ENV: &str = "MOVIE_QUIZ_BASE_URL";
/// Environment variable overriding the username to log in with.
const USERNAME_ENV: &str = "MOVIE_QUIZ_USERNAME";

const DEFAULT_BASE_URL: &str = "https://movies.moum.it";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
const DEFAULT_MIN_REFRESH_MS: u64 = 250;
const DEFAULT_MAX_REFRESH_MS: u64 = 300_000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Runtime configuration of the client.
pub struct ClientConfig {
    pub base_url: String,
    /// Player to log in as on startup, if any.
    pub username: Option<String>,
    pub request_timeout: Duration,
    pub scheduler: SchedulerSettings,
}

impl ClientConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), base_url = %config.base_url, "loaded client config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides(env::var(BASE_URL_ENV).ok(), env::var(USERNAME_ENV).ok())
    }

    /// Parse a JSON configuration document; omitted fields take their default value.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    fn with_env_overrides(mut self, base_url: Option<String>, username: Option<String>) -> Self {
        if let Some(base_url) = base_url.filter(|value| !value.trim().is_empty()) {
            self.base_url = base_url;
        }
        if let Some(username) = username.filter(|value| !value.trim().is_empty()) {
            self.username = Some(username);
        }
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    base_url: String,
    username: Option<String>,
    request_timeout_ms: u64,
    retry_delay_ms: u64,
    min_refresh_ms: u64,
    max_refresh_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            username: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            min_refresh_ms: DEFAULT_MIN_REFRESH_MS,
            max_refresh_ms: DEFAULT_MAX_REFRESH_MS,
        }
    }
}

impl From<RawConfig> for ClientConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            base_url: value.base_url,
            username: value.username,
            request_timeout: Duration::from_millis(value.request_timeout_ms),
            scheduler: SchedulerSettings {
                retry_delay: Duration::from_millis(value.retry_delay_ms),
                min_interval: Duration::from_millis(value.min_refresh_ms),
                max_interval: Duration::from_millis(value.max_refresh_ms),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
