//! Configuration management using the prefer crate for discovery.
//!
//! A settings file supplies at least `port` and `baseURL`. Anything invalid
//! is fatal at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::extract::ScanMode;

/// Settings file looked for in the working directory before discovery.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Host the server binds to when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings file {path} could not be parsed: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no port specified in settings")]
    MissingPort,

    #[error("invalid port number {0} specified in settings")]
    InvalidPort(i64),

    #[error("no base URL specified in settings")]
    MissingBaseUrl,

    #[error("invalid base URL {value}: {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Settings file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Interface to bind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Port to listen on (1-65535).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    /// Root of the advisory site, e.g. `https://www.smartraveller.gov.au`.
    #[serde(
        default,
        rename = "baseURL",
        alias = "base_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_url: Option<String>,
    /// Upstream request timeout in seconds. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// User agent string. Defaults to the crate name and version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// How embedded JSON is delimited in page markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_scan: Option<ScanMode>,
    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load `settings.json` from the working directory if present, otherwise
    /// let prefer discover an `advisories` config file.
    pub async fn load() -> Result<Self, ConfigError> {
        let local = Path::new(DEFAULT_SETTINGS_FILE);
        if local.is_file() {
            return Self::load_from_path(local).await;
        }

        match prefer::load("advisories").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    Self::load_from_path(path).await
                } else {
                    Ok(Self::default())
                }
            }
            Err(_) => {
                tracing::debug!("No config file discovered, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    /// JSON unless the extension says TOML or YAML.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            _ => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        }
    }
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub base_url: Url,
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub json_scan: ScanMode,
}

impl Settings {
    /// Validate a loaded config.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let port = match config.port {
            None => return Err(ConfigError::MissingPort),
            Some(p) => u16::try_from(p)
                .ok()
                .filter(|p| *p >= 1)
                .ok_or(ConfigError::InvalidPort(p))?,
        };

        let raw_base = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = Url::parse(raw_base).map_err(|source| ConfigError::InvalidBaseUrl {
            value: raw_base.to_string(),
            source,
        })?;

        Ok(Self {
            host: config
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            base_url,
            request_timeout: config.request_timeout.map(Duration::from_secs),
            user_agent: config.user_agent.clone(),
            json_scan: config.json_scan.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(port: Option<i64>, base_url: Option<&str>) -> Config {
        Config {
            port,
            base_url: base_url.map(str::to_string),
            ..Config::default()
        }
    }

    #[test]
    fn test_settings_valid() {
        let settings =
            Settings::from_config(&config(Some(3000), Some("https://advice.example.gov"))).unwrap();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.base_url.as_str(), "https://advice.example.gov/");
        assert_eq!(settings.json_scan, ScanMode::Outermost);
        assert!(settings.request_timeout.is_none());
    }

    #[test]
    fn test_settings_port_range() {
        for bad in [0, -1, 65536] {
            assert!(matches!(
                Settings::from_config(&config(Some(bad), Some("https://a.example"))),
                Err(ConfigError::InvalidPort(p)) if p == bad
            ));
        }
        assert!(Settings::from_config(&config(Some(65535), Some("https://a.example"))).is_ok());
        assert!(matches!(
            Settings::from_config(&config(None, Some("https://a.example"))),
            Err(ConfigError::MissingPort)
        ));
    }

    #[test]
    fn test_settings_base_url_required() {
        assert!(matches!(
            Settings::from_config(&config(Some(80), None)),
            Err(ConfigError::MissingBaseUrl)
        ));
        assert!(matches!(
            Settings::from_config(&config(Some(80), Some("  "))),
            Err(ConfigError::MissingBaseUrl)
        ));
        assert!(matches!(
            Settings::from_config(&config(Some(80), Some("not a url"))),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_json_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"port": 8080, "baseURL": "https://advice.example.gov", "json_scan": "balanced"}"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));

        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.json_scan, ScanMode::Balanced);
    }

    #[tokio::test]
    async fn test_load_toml_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("advisories.toml");
        std::fs::write(
            &path,
            "port = 9000\nbase_url = \"https://advice.example.gov\"\nrequest_timeout = 10\n",
        )
        .unwrap();

        let settings = Settings::from_config(&Config::load_from_path(&path).await.unwrap()).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_load_malformed_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"port": 80.5, "baseURL": "#).unwrap();

        assert!(matches!(
            Config::load_from_path(&path).await,
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            Config::load_from_path(&dir.path().join("missing.json")).await,
            Err(ConfigError::Read { .. })
        ));
    }
}
