// Configuration loading functionality
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::types::{AppConfig, AppConfigToml, ConfigError};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RIGSCOPE_CONFIG";
/// Environment variable that overrides the configured API token.
pub const TOKEN_ENV: &str = "RIGSCOPE_TOKEN";

const SYSTEM_CONFIG_PATHS: [&str; 2] = ["/etc/xdg/rigscope/config.toml", "/etc/rigscope.toml"];

/// Candidate config files, most specific first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut config_paths: Vec<PathBuf> = Vec::new();

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        config_paths.push(PathBuf::from(path));
    }

    // User-specific path
    if let Some(config_dir) = dirs::config_dir() {
        config_paths.push(config_dir.join("rigscope/config.toml"));
    } else {
        warn!("Could not determine config directory. User-specific config will not be loaded.");
    }

    config_paths.extend(SYSTEM_CONFIG_PATHS.iter().map(PathBuf::from));
    config_paths
}

/// First config file that exists on disk, if any.
pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|path| path.exists())
}

// Token from the environment wins over the file
fn apply_env_overrides(mut config: AppConfig) -> AppConfig {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            debug!("Using API token from {TOKEN_ENV}");
            config.api.token = Some(token.trim().to_string());
        }
    }
    config
}

/// Parse configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    let toml_app_config = toml::from_str::<AppConfigToml>(contents)?;
    AppConfig::try_from(toml_app_config)
}

/// Load configuration from one specific file.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config = parse_config(&contents)?;
    Ok(apply_env_overrides(config))
}

// The primary function to load application configuration.
// It tries the explicit, user-specific and then system-wide TOML files.
// Falls back to default settings if no file is found or if parsing fails.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    for path in config_search_paths() {
        if !path.exists() {
            continue;
        }

        debug!("Attempting to load config from: {}", path.display());
        match load_config_from_path(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                return Ok(config);
            }
            Err(e) => {
                warn!("Error loading config file {}: {e}", path.display());
            }
        }
    }

    debug!("No configuration file found or all failed to parse. Using default configuration.");
    let default_config = AppConfig::try_from(AppConfigToml::default())?;
    Ok(apply_env_overrides(default_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_API_BASE_URL, LogLevel};
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.timeout_sec, 10);
        assert_eq!(config.daemon.poll_interval_sec, 30);
        assert_eq!(config.daemon.log_level, LogLevel::Info);
        assert!(config.daemon.report_file_path.is_none());
    }

    #[test]
    fn full_file_is_parsed() {
        let config = parse_config(
            r#"
            [api]
            base_url = "https://monitor.example.com/api/"
            token = "abc123"
            timeout_sec = 3

            [daemon]
            poll_interval_sec = 5
            fan_poll_interval_sec = 15
            log_level = "Debug"
            report_file_path = "/tmp/rigscope.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://monitor.example.com/api");
        assert_eq!(config.api.token.as_deref(), Some("abc123"));
        assert_eq!(config.daemon.fan_poll_interval_sec, 15);
        assert_eq!(config.daemon.log_level, LogLevel::Debug);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            parse_config("[api]\nbase_url = \"localhost:8000\""),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            parse_config("[daemon]\npoll_interval_sec = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            parse_config("[daemon]\nfan_poll_interval_sec = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            parse_config("[daemon]\nlog_level = \"Loud\""),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn poll_interval_is_bounded() {
        for interval in [4, 3601] {
            assert!(matches!(
                parse_config(&format!("[daemon]\npoll_interval_sec = {interval}")),
                Err(ConfigError::ValidationError(_))
            ));
        }
        for interval in [5, 3600] {
            let config =
                parse_config(&format!("[daemon]\npoll_interval_sec = {interval}")).unwrap();
            assert_eq!(config.daemon.poll_interval_sec, interval);
        }
    }

    #[test]
    fn loads_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[daemon]\npoll_interval_sec = 7").unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.daemon.poll_interval_sec, 7);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config_from_path(dir.path().join("absent.toml")),
            Err(ConfigError::IoError(_))
        ));
    }
}
