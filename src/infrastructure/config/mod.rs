//! Configuration management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;
use crate::domain::entities::Destination;

/// File holding the active destination, inside the data directory
pub const DESTINATION_FILE: &str = "active_group.jid";

/// Relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub destination: DestinationConfig,
    pub webhook: WebhookConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DestinationConfig {
    /// Static fallback used while no `/group` override exists
    pub fallback: Option<Destination>,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WebhookConfig {
    /// Shared secret expected in `X-Webhook-Secret`; unset disables the check
    pub secret: Option<String>,
    pub issue_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionAdapter {
    Bridge,
    Console,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionConfig {
    pub adapter: SessionAdapter,
    pub bridge_url: String,
    /// Session name on the bridge
    pub name: String,
    /// Where the bridge keeps the session credentials
    pub store_path: PathBuf,
    pub poll_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "jira-relay-bot".to_string(),
                connect_timeout_secs: 30,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            destination: DestinationConfig {
                fallback: None,
                data_dir: PathBuf::from("."),
            },
            webhook: WebhookConfig {
                secret: None,
                issue_base_url: "https://integratelperu.atlassian.net".to_string(),
            },
            session: SessionConfig {
                adapter: SessionAdapter::Bridge,
                bridge_url: "http://127.0.0.1:8080".to_string(),
                name: "default".to_string(),
                store_path: PathBuf::from("session.db"),
                poll_timeout_secs: 30,
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path` when it exists, else defaults; env vars override both
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override settings from environment-style variables
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT={}", port)))?;
        }
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(dir) = var("DATA_DIR") {
            self.destination.data_dir = PathBuf::from(dir);
        }
        if let Some(jid) = var("WHATSAPP_GROUP_JID") {
            let fallback = jid
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("WHATSAPP_GROUP_JID: {}", e)))?;
            self.destination.fallback = Some(fallback);
        }
        if let Some(secret) = var("WEBHOOK_SECRET") {
            self.webhook.secret = Some(secret);
        }
        if let Some(url) = var("JIRA_URL") {
            self.webhook.issue_base_url = url;
        }
        if let Some(adapter) = var("SESSION_ADAPTER") {
            self.session.adapter = match adapter.trim().to_lowercase().as_str() {
                "bridge" => SessionAdapter::Bridge,
                "console" => SessionAdapter::Console,
                other => return Err(ConfigError::InvalidValue(format!("SESSION_ADAPTER={}", other))),
            };
        }
        if let Some(url) = var("BRIDGE_URL") {
            self.session.bridge_url = url;
        }
        if let Some(name) = var("SESSION_NAME") {
            self.session.name = name;
        }
        if let Some(secs) = var("CONNECT_TIMEOUT_SECS") {
            self.bot.connect_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("CONNECT_TIMEOUT_SECS={}", secs)))?;
        }

        Ok(())
    }

    pub fn destination_file(&self) -> PathBuf {
        self.destination.data_dir.join(DESTINATION_FILE)
    }

    /// Session store path, relative paths resolved against the data directory
    pub fn session_store(&self) -> PathBuf {
        if self.session.store_path.is_absolute() {
            self.session.store_path.clone()
        } else {
            self.destination.data_dir.join(&self.session.store_path)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.bot.connect_timeout_secs)
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook.secret.as_deref().filter(|s| !s.is_empty())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
