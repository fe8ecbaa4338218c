use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub mattermost: MattermostConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String, // route PagerDuty posts to
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MattermostConfig {
    pub webhook_url: String,
    pub icon_url: String,
    pub username: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                path: "/PagerDutyNotification".to_string(),
            },
            mattermost: MattermostConfig {
                webhook_url: String::new(),
                icon_url: "https://i.imgur.com/LGpqJQy.png".to_string(),
                username: "Pagerduty".to_string(),
                timeout: Duration::from_secs(10),
                max_in_flight: None,
            },
        }
    }
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Values given on the command line or through the environment.
/// They win over whatever the file says.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mattermost_url: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.mattermost_url {
            config.mattermost.webhook_url = url.clone();
        }
    }
}

#[async_trait::async_trait]
pub trait ConfigManager {
    async fn load_config(&self) -> Result<Config>;
    fn validate_config(&self, config: &Config) -> Result<()>;
}

pub struct FileConfigManager {
    config_path: PathBuf,
    overrides: ConfigOverrides,
}

impl FileConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[async_trait::async_trait]
impl ConfigManager for FileConfigManager {
    async fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config_path);

        if !self.config_path.exists() {
            warn!(
                "Configuration file not found, creating default config at {:?}",
                self.config_path
            );
            self.create_default_config().await?;
        }

        let config_content = fs::read_to_string(&self.config_path)
            .map_err(|e| RelayError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&config_content)?;

        self.overrides.apply(&mut config);
        self.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    fn validate_config(&self, config: &Config) -> Result<()> {
        debug!("Validating configuration");

        if config.server.port == 0 {
            return Err(RelayError::ConfigError("port must be between 1 and 65535".to_string()));
        }
        if config.server.host.trim().is_empty() {
            return Err(RelayError::ConfigError("host cannot be empty".to_string()));
        }
        if !config.server.path.starts_with('/') {
            return Err(RelayError::ConfigError(format!(
                "path '{}' must start with '/'",
                config.server.path
            )));
        }

        let webhook_url = config.mattermost.webhook_url.trim();
        if webhook_url.is_empty() {
            return Err(RelayError::ConfigError(
                "mattermost webhook_url is not set (use --mattermost-url or MATTERMOST_URL)".to_string(),
            ));
        }
        if !Self::is_http_url(webhook_url) {
            return Err(RelayError::ConfigError(
                "webhook_url must start with http:// or https://".to_string(),
            ));
        }
        if !Self::is_http_url(&config.mattermost.icon_url) {
            return Err(RelayError::ConfigError(
                "icon_url must start with http:// or https://".to_string(),
            ));
        }

        if config.mattermost.timeout < Duration::from_secs(1) {
            return Err(RelayError::ConfigError("timeout must be at least 1s".to_string()));
        }
        if config.mattermost.timeout > Duration::from_secs(300) {
            return Err(RelayError::ConfigError("timeout cannot exceed 5 minutes".to_string()));
        }
        if config.mattermost.max_in_flight == Some(0) {
            return Err(RelayError::ConfigError(
                "max_in_flight must be greater than 0 when set".to_string(),
            ));
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

impl FileConfigManager {
    /// Create a default configuration file
    async fn create_default_config(&self) -> Result<()> {
        let toml_content = toml::to_string_pretty(&Config::default())
            .map_err(|e| {
                RelayError::ConfigError(format!("Failed to serialize default config: {}", e))
            })?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RelayError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(&self.config_path, toml_content).map_err(|e| {
            RelayError::ConfigError(format!("Failed to write default config: {}", e))
        })?;

        info!("Default configuration file created at {:?}", self.config_path);
        Ok(())
    }

    fn is_http_url(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.mattermost.webhook_url = "https://chat.example.com/hooks/abc".to_string();
        config
    }

    #[tokio::test]
    async fn test_missing_file_writes_default_but_needs_a_url() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("relay.toml");
        let manager = FileConfigManager::new(config_path.clone());

        let err = manager.load_config().await.unwrap_err();
        assert!(matches!(err, RelayError::ConfigError(_)));
        assert!(config_path.exists());
    }

    #[tokio::test]
    async fn test_overrides_complete_the_default_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("relay.toml");
        let manager = FileConfigManager::new(config_path).with_overrides(ConfigOverrides {
            host: None,
            port: Some(9000),
            mattermost_url: Some("https://chat.example.com/hooks/abc".to_string()),
        });

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.path, "/PagerDutyNotification");
        assert_eq!(config.mattermost.username, "Pagerduty");
        assert_eq!(config.mattermost.timeout, Duration::from_secs(10));
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("relay.toml");
        fs::write(
            &config_path,
            r#"
[server]
host = "127.0.0.1"
port = 8181
path = "/hooks/pagerduty"

[mattermost]
webhook_url = "https://chat.example.com/hooks/abc"
icon_url = "https://example.com/pd.png"
username = "PD"
timeout = "3s"
max_in_flight = 8
"#,
        )
        .unwrap();

        let config = FileConfigManager::new(config_path).load_config().await.unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:8181");
        assert_eq!(config.server.path, "/hooks/pagerduty");
        assert_eq!(config.mattermost.username, "PD");
        assert_eq!(config.mattermost.timeout, Duration::from_secs(3));
        assert_eq!(config.mattermost.max_in_flight, Some(8));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_config_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("relay.toml");
        fs::write(&config_path, "[server\nport = ").unwrap();

        let err = FileConfigManager::new(config_path).load_config().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_config_validation() {
        let manager = FileConfigManager::new(PathBuf::from("test.toml"));

        assert!(manager.validate_config(&valid_config()).is_ok());

        let mut invalid = valid_config();
        invalid.mattermost.webhook_url = "chat.example.com/hooks/abc".to_string();
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = valid_config();
        invalid.server.port = 0;
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = valid_config();
        invalid.server.path = "PagerDutyNotification".to_string();
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = valid_config();
        invalid.mattermost.timeout = Duration::from_millis(100);
        assert!(manager.validate_config(&invalid).is_err());

        let mut invalid = valid_config();
        invalid.mattermost.max_in_flight = Some(0);
        assert!(manager.validate_config(&invalid).is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = valid_config();
        ConfigOverrides {
            host: Some("127.0.0.1".to_string()),
            port: None,
            mattermost_url: Some("http://localhost:8065/hooks/x".to_string()),
        }
        .apply(&mut config);

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.mattermost.webhook_url, "http://localhost:8065/hooks/x");
    }
}
