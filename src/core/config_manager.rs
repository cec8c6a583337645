// src/core/config_manager.rs
//! Configuration: built-in defaults, then an optional YAML file with
//! `local` / `production` sections, then `HIREBOARD_*` environment variables.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_MEDIA_UPLOAD_URL: &str = "https://api.cloudinary.com/v1_1/dogx6peuh/upload";
pub const DEFAULT_UPLOAD_PRESET: &str = "flask-upload";
pub const DEFAULT_CLOUD_NAME: &str = "rmsmms";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub api: ApiConfig,
    pub media: MediaConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaConfig {
    pub upload_url: String,
    pub upload_preset: String,
    pub cloud_name: String,
}

impl MediaConfig {
    /// Host of the upload endpoint; requests there never carry the API token
    pub fn host(&self) -> Result<String> {
        let url = Url::parse(&self.upload_url)
            .with_context(|| format!("Invalid media upload URL: {}", self.upload_url))?;
        url.host_str()
            .map(|h| h.to_string())
            .ok_or_else(|| anyhow::anyhow!("Media upload URL has no host: {}", self.upload_url))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub path: PathBuf,
    pub level: String,
}

/// One environment section of the config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Overlay {
    api_url: Option<String>,
    timeout_seconds: Option<u64>,
    media_upload_url: Option<String>,
    upload_preset: Option<String>,
    cloud_name: Option<String>,
    storage_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
    log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: Overlay,
    production: Overlay,
}

impl ConfigManager {
    /// Load from the process environment and `config.yaml` (or `HIREBOARD_CONFIG`)
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let config_path = vars
            .get("HIREBOARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        Self::load_with(&config_path, &vars)
    }

    /// Load with an explicit config file path; a missing file is skipped
    pub fn load_with(config_path: &Path, vars: &HashMap<String, String>) -> Result<Self> {
        let yaml = if config_path.exists() {
            Some(
                std::fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read {}", config_path.display()))?,
            )
        } else {
            None
        };

        let config = Self::from_sources(yaml.as_deref(), vars)?;
        info!(
            "Loaded configuration for environment: {} (file: {})",
            config.environment,
            if yaml.is_some() {
                config_path.display().to_string()
            } else {
                "none".to_string()
            }
        );
        Ok(config)
    }

    /// Assemble configuration from file contents and variables
    pub fn from_sources(yaml: Option<&str>, vars: &HashMap<String, String>) -> Result<Self> {
        let environment = Self::get_environment(vars);

        let file: ConfigFile = match yaml {
            Some(content) if !content.trim().is_empty() => {
                serde_yaml::from_str(content).context("Failed to parse config file")?
            }
            _ => ConfigFile::default(),
        };
        let overlay = match environment.as_str() {
            "production" => file.production,
            _ => file.local,
        };

        let var = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();

        let timeout_seconds = match var("HIREBOARD_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("HIREBOARD_TIMEOUT must be a number, got {}", raw))?,
            None => overlay.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };

        let api = ApiConfig {
            base_url: var("HIREBOARD_API_URL")
                .or(overlay.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout_seconds,
        };
        Url::parse(&api.base_url)
            .with_context(|| format!("Invalid API URL: {}", api.base_url))?;

        let media = MediaConfig {
            upload_url: var("HIREBOARD_MEDIA_UPLOAD_URL")
                .or(overlay.media_upload_url)
                .unwrap_or_else(|| DEFAULT_MEDIA_UPLOAD_URL.to_string()),
            upload_preset: var("HIREBOARD_UPLOAD_PRESET")
                .or(overlay.upload_preset)
                .unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string()),
            cloud_name: var("HIREBOARD_CLOUD_NAME")
                .or(overlay.cloud_name)
                .unwrap_or_else(|| DEFAULT_CLOUD_NAME.to_string()),
        };
        media.host()?;

        let storage = StorageConfig {
            path: var("HIREBOARD_STORAGE_PATH")
                .map(PathBuf::from)
                .or(overlay.storage_path)
                .unwrap_or_else(default_storage_path),
        };

        let log = LogConfig {
            path: var("HIREBOARD_LOG_PATH")
                .map(PathBuf::from)
                .or(overlay.log_path)
                .unwrap_or_else(|| std::env::temp_dir().join("hireboard.log")),
            level: var("HIREBOARD_LOG_LEVEL")
                .or(overlay.log_level)
                .unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            environment,
            api,
            media,
            storage,
            log,
        })
    }

    fn get_environment(vars: &HashMap<String, String>) -> String {
        vars.get("HIREBOARD_ENV")
            .or_else(|| vars.get("ENVIRONMENT"))
            .cloned()
            .unwrap_or_else(|| "local".to_string())
    }

    /// Ensure the storage and log directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        for file in [&self.storage.path, &self.log.path] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hireboard")
        .join("storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const YAML: &str = r#"
local:
  api_url: http://127.0.0.1:8000/api
  log_level: debug
production:
  api_url: https://api.hireboard.example/api
  timeout_seconds: 10
  cloud_name: prod-cloud
"#;

    #[test]
    fn test_defaults_without_file() {
        let config = ConfigManager::from_sources(None, &HashMap::new()).unwrap();
        assert_eq!(config.environment, "local");
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.media.upload_preset, "flask-upload");
        assert_eq!(config.media.host().unwrap(), "api.cloudinary.com");
        assert!(config.storage.path.ends_with("hireboard/storage.json"));
    }

    #[test]
    fn test_environment_selects_section() {
        let local = ConfigManager::from_sources(Some(YAML), &HashMap::new()).unwrap();
        assert_eq!(local.api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(local.log.level, "debug");

        let prod =
            ConfigManager::from_sources(Some(YAML), &vars(&[("ENVIRONMENT", "production")]))
                .unwrap();
        assert_eq!(prod.api.base_url, "https://api.hireboard.example/api");
        assert_eq!(prod.api.timeout_seconds, 10);
        assert_eq!(prod.media.cloud_name, "prod-cloud");
        assert_eq!(prod.log.level, "info");
    }

    #[test]
    fn test_env_vars_override_file() {
        let config = ConfigManager::from_sources(
            Some(YAML),
            &vars(&[
                ("HIREBOARD_ENV", "production"),
                ("ENVIRONMENT", "local"),
                ("HIREBOARD_API_URL", "http://override:9000/api"),
                ("HIREBOARD_TIMEOUT", "3"),
                ("HIREBOARD_STORAGE_PATH", "/tmp/hb/storage.json"),
            ]),
        )
        .unwrap();
        assert_eq!(config.environment, "production");
        assert_eq!(config.api.base_url, "http://override:9000/api");
        assert_eq!(config.api.timeout_seconds, 3);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/hb/storage.json"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ConfigManager::from_sources(None, &vars(&[("HIREBOARD_TIMEOUT", "soon")])).is_err());
        assert!(
            ConfigManager::from_sources(None, &vars(&[("HIREBOARD_API_URL", "not a url")])).is_err()
        );
        assert!(ConfigManager::from_sources(Some("local:\n  colour: blue\n"), &HashMap::new()).is_err());
    }

    #[test]
    fn test_load_with_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigManager::load_with(&dir.path().join("absent.yaml"), &HashMap::new()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
    }

    #[tokio::test]
    async fn test_ensure_directories_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ConfigManager::from_sources(None, &HashMap::new()).unwrap();
        config.storage.path = dir.path().join("state/storage.json");
        config.log.path = dir.path().join("logs/hireboard.log");

        config.ensure_directories().await.unwrap();
        assert!(dir.path().join("state").is_dir());
        assert!(dir.path().join("logs").is_dir());
    }
}
