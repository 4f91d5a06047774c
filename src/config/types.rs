// Configuration types and structures for rigscope
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Allowed cadence of full analyses in the daemon.
pub const POLL_INTERVAL_RANGE_SEC: std::ops::RangeInclusive<u64> = 5..=3600;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>, // bearer token, never written back out
    pub timeout_sec: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
            timeout_sec: default_timeout_sec(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub poll_interval_sec: u64,
    pub fan_poll_interval_sec: u64,
    pub log_level: LogLevel,
    pub report_file_path: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_sec: default_poll_interval_sec(),
            fan_poll_interval_sec: default_fan_poll_interval_sec(),
            log_level: default_log_level(),
            report_file_path: default_report_file_path(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(toml::de::Error),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::TomlError(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "I/O error: {e}"),
            Self::TomlError(e) => write!(f, "TOML parsing error: {e}"),
            Self::ValidationError(s) => write!(f, "Configuration validation error: {s}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// Intermediate structs for TOML parsing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfigToml {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub token: Option<String>,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

impl Default for ApiConfigToml {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_sec: default_timeout_sec(),
        }
    }
}

impl TryFrom<ApiConfigToml> for ApiConfig {
    type Error = ConfigError;

    fn try_from(toml_config: ApiConfigToml) -> Result<Self, Self::Error> {
        let base_url = toml_config
            .base_url
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "API base URL '{base_url}' must start with http:// or https://"
            )));
        }
        if toml_config.timeout_sec == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            token: toml_config.token.filter(|t| !t.trim().is_empty()),
            timeout_sec: toml_config.timeout_sec,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DaemonConfigToml {
    #[serde(default = "default_poll_interval_sec")]
    pub poll_interval_sec: u64,
    #[serde(default = "default_fan_poll_interval_sec")]
    pub fan_poll_interval_sec: u64,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "default_report_file_path")]
    pub report_file_path: Option<String>,
}

impl Default for DaemonConfigToml {
    fn default() -> Self {
        Self {
            poll_interval_sec: default_poll_interval_sec(),
            fan_poll_interval_sec: default_fan_poll_interval_sec(),
            log_level: default_log_level(),
            report_file_path: default_report_file_path(),
        }
    }
}

impl TryFrom<DaemonConfigToml> for DaemonConfig {
    type Error = ConfigError;

    fn try_from(toml_config: DaemonConfigToml) -> Result<Self, Self::Error> {
        if !POLL_INTERVAL_RANGE_SEC.contains(&toml_config.poll_interval_sec) {
            return Err(ConfigError::ValidationError(format!(
                "poll_interval_sec must be between {} and {} seconds, got {}",
                POLL_INTERVAL_RANGE_SEC.start(),
                POLL_INTERVAL_RANGE_SEC.end(),
                toml_config.poll_interval_sec
            )));
        }
        if toml_config.fan_poll_interval_sec == 0 {
            return Err(ConfigError::ValidationError(
                "fan_poll_interval_sec must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            poll_interval_sec: toml_config.poll_interval_sec,
            fan_poll_interval_sec: toml_config.fan_poll_interval_sec,
            log_level: toml_config.log_level,
            report_file_path: toml_config.report_file_path,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AppConfigToml {
    #[serde(default)]
    pub api: ApiConfigToml,
    #[serde(default)]
    pub daemon: DaemonConfigToml,
}

impl TryFrom<AppConfigToml> for AppConfig {
    type Error = ConfigError;

    fn try_from(toml_config: AppConfigToml) -> Result<Self, Self::Error> {
        Ok(Self {
            api: ApiConfig::try_from(toml_config.api)?,
            daemon: DaemonConfig::try_from(toml_config.daemon)?,
        })
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_timeout_sec() -> u64 {
    10
}

// The dashboard refreshes its views every 5 to 30 seconds
const fn default_poll_interval_sec() -> u64 {
    30
}

const fn default_fan_poll_interval_sec() -> u64 {
    30
}

const fn default_log_level() -> LogLevel {
    LogLevel::Info
}

const fn default_report_file_path() -> Option<String> {
    None
}
