//! Tracker configuration
//!
//! Loaded from YAML, then overridden from the environment (`.env` is read
//! first). Every field has a default, so an empty file is a valid config.

use crate::multiplexer::MultiplexerConfig;
use pushsockets::{TextPassivePing, TransportConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_PUSH_URL: &str = "wss://ws-store.xsolla.com/connection/websocket";
pub const DEFAULT_API_URL: &str = "https://store.xsolla.com";

/// Server heartbeat probe and our reply
const PASSIVE_PING_FRAME: &str = "{}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Store project the orders belong to
    pub project_id: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    pub push: PushConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub url: String,
    pub heartbeat_interval_secs: u64,
    /// Heartbeat ticks between application pings
    pub ping_threshold: u32,
    /// Seconds without a connection before push trackers fall back
    pub timeout_limit_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Deadline used when the caller does not pass one
    pub default_deadline_secs: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            project_id: 0,
            log_level: default_log_level(),
            push: PushConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PUSH_URL.to_string(),
            heartbeat_interval_secs: 25,
            ping_threshold: 1,
            timeout_limit_secs: 600,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            poll_interval_secs: 3,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            default_deadline_secs: 300,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TrackingConfig {
    /// Load configuration from a YAML file, apply env overrides and validate
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml_str(&yaml_content)?;
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse YAML without touching the environment or validating
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("ORDER_TRACKER_PROJECT_ID") {
            info!("Overriding project id from environment variable");
            self.project_id = value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: "ORDER_TRACKER_PROJECT_ID".to_string(),
                value,
            })?;
        }

        if let Ok(url) = std::env::var("ORDER_TRACKER_PUSH_URL") {
            info!("Overriding push URL from environment variable");
            self.push.url = url;
        }

        if let Ok(url) = std::env::var("ORDER_TRACKER_API_URL") {
            info!("Overriding API URL from environment variable");
            self.polling.base_url = url;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id == 0 {
            return Err(ConfigError::ValidationError(
                "project_id must be set".to_string(),
            ));
        }

        if !(self.push.url.starts_with("ws://") || self.push.url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(
                "push.url must start with ws:// or wss://".to_string(),
            ));
        }

        if !(self.polling.base_url.starts_with("http://") || self.polling.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "polling.base_url must start with http:// or https://".to_string(),
            ));
        }

        let intervals = [
            ("push.heartbeat_interval_secs", self.push.heartbeat_interval_secs),
            ("push.timeout_limit_secs", self.push.timeout_limit_secs),
            ("push.connect_timeout_secs", self.push.connect_timeout_secs),
            ("polling.poll_interval_secs", self.polling.poll_interval_secs),
            ("polling.request_timeout_secs", self.polling.request_timeout_secs),
            ("polling.connect_timeout_secs", self.polling.connect_timeout_secs),
            ("polling.default_deadline_secs", self.polling.default_deadline_secs),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if self.push.ping_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "push.ping_threshold must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Project id: {}", self.project_id);
        info!("  Push URL: {}", self.push.url);
        info!(
            "  Heartbeat: every {}s, ping every {} tick(s), give up after {}s",
            self.push.heartbeat_interval_secs, self.push.ping_threshold, self.push.timeout_limit_secs
        );
        info!("  API URL: {}", self.polling.base_url);
        info!("  Poll interval: {}s", self.polling.poll_interval_secs);
        info!("  Default deadline: {}s", self.polling.default_deadline_secs);
        info!("  Log level: {}", self.log_level);
    }

    pub fn multiplexer_config(&self) -> MultiplexerConfig {
        MultiplexerConfig::new(self.project_id)
            .with_heartbeat_interval(Duration::from_secs(self.push.heartbeat_interval_secs))
            .with_ping_threshold(self.push.ping_threshold)
            .with_timeout_limit(Duration::from_secs(self.push.timeout_limit_secs))
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.push.url.clone())
            .with_passive_ping(Arc::new(TextPassivePing::new(
                PASSIVE_PING_FRAME,
                PASSIVE_PING_FRAME,
            )))
            .with_connect_timeout(Duration::from_secs(self.push.connect_timeout_secs))
    }
}
