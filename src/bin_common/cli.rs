//! CLI utilities for binaries
//!
//! Handles configuration loading, environment variables and argument
//! parsing for the tracker binaries.

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

/// Environment variable holding the user's access token
pub const ACCESS_TOKEN_ENV: &str = "ORDER_TRACKER_ACCESS_TOKEN";

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Tracker configuration (tracker_config.yaml)
    Tracker,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Tracker => "config/tracker_config.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Tracker => "ORDER_TRACKER_CONFIG_PATH",
            ConfigType::Custom(_) => "ORDER_TRACKER_CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use order_status_tracker::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Tracker);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    match config_type {
        ConfigType::Custom(path) => path.into(),
        other => std::env::var(other.env_var_name())
            .unwrap_or_else(|_| other.default_path().to_string())
            .into(),
    }
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Arguments of `track_order <order_id> [--poll-first] [--deadline <secs>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackArgs {
    pub order_id: i64,
    pub poll_first: bool,
    pub deadline_secs: Option<u64>,
}

impl TrackArgs {
    pub const USAGE: &'static str = "Usage: track_order <order_id> [--poll-first] [--deadline <secs>]";

    pub fn parse(args: &[String]) -> Result<Self> {
        let mut order_id = None;
        let mut poll_first = false;
        let mut deadline_secs = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--poll-first" => poll_first = true,
                "--deadline" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("--deadline needs a value\n{}", Self::USAGE))?;
                    deadline_secs = Some(
                        value
                            .parse()
                            .map_err(|_| anyhow!("Invalid deadline '{}'", value))?,
                    );
                }
                flag if flag.starts_with("--") => bail!("Unknown option '{}'\n{}", flag, Self::USAGE),
                value => {
                    if order_id.is_some() {
                        bail!("Unexpected argument '{}'\n{}", value, Self::USAGE);
                    }
                    order_id = Some(
                        value
                            .parse()
                            .map_err(|_| anyhow!("Invalid order id '{}'", value))?,
                    );
                }
            }
        }

        let order_id = order_id.ok_or_else(|| anyhow!(Self::USAGE))?;

        Ok(Self {
            order_id,
            poll_first,
            deadline_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Tracker.default_path(), "config/tracker_config.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_config_type_env_vars() {
        assert_eq!(ConfigType::Tracker.env_var_name(), "ORDER_TRACKER_CONFIG_PATH");
    }

    #[test]
    fn test_track_args_defaults() {
        let parsed = TrackArgs::parse(&args(&["12345"])).unwrap();
        assert_eq!(
            parsed,
            TrackArgs {
                order_id: 12345,
                poll_first: false,
                deadline_secs: None,
            }
        );
    }

    #[test]
    fn test_track_args_flags_in_any_order() {
        let parsed = TrackArgs::parse(&args(&["--deadline", "60", "777", "--poll-first"])).unwrap();
        assert_eq!(parsed.order_id, 777);
        assert!(parsed.poll_first);
        assert_eq!(parsed.deadline_secs, Some(60));
    }

    #[test]
    fn test_track_args_errors() {
        assert!(TrackArgs::parse(&args(&[])).is_err());
        assert!(TrackArgs::parse(&args(&["abc"])).is_err());
        assert!(TrackArgs::parse(&args(&["1", "2"])).is_err());
        assert!(TrackArgs::parse(&args(&["1", "--deadline"])).is_err());
        assert!(TrackArgs::parse(&args(&["1", "--verbose"])).is_err());
    }
}
