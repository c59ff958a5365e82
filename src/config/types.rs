//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::limits::LimitsConfig;
use super::listen::ListenConfig;
use super::policy::PolicyConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Relay configuration. Every table is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Login and idle deadlines.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    /// Line length and outbox limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Routing policy switches.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs only (default: "relay.local").
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

fn default_server_name() -> String {
    "relay.local".to_string()
}

/// Connection deadlines, in seconds.
///
/// - `login`: time from accept until a display name must have arrived (default: 60)
/// - `idle`: time a logged-in client may go without sending a valid line (default: 60)
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_login_timeout")]
    pub login: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle: u64,
}

impl TimeoutsConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle)
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            login: default_login_timeout(),
            idle: default_idle_timeout(),
        }
    }
}

fn default_login_timeout() -> u64 {
    60
}

fn default_idle_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.name, "relay.local");
        assert_eq!(config.listen.address.port(), 5000);
        assert_eq!(config.timeouts.login_timeout(), Duration::from_secs(60));
        assert_eq!(config.timeouts.idle_timeout(), Duration::from_secs(60));
        assert_eq!(config.limits.max_line_len, 4096);
        assert!(!config.policy.echo_broadcasts);
        assert!(config.policy.reject_reserved_names);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[listen]
address = "127.0.0.1:6000"

[timeouts]
idle = 5
"#,
        )
        .unwrap();
        assert_eq!(config.listen.address.to_string(), "127.0.0.1:6000");
        assert_eq!(config.timeouts.idle, 5);
        assert_eq!(config.timeouts.login, 60);
        assert_eq!(config.limits.outbox_capacity, 256);
    }

    #[test]
    fn sample_config_parses_and_validates() {
        let config: Config = toml::from_str(include_str!("../../config.toml")).unwrap();
        assert_eq!(config.listen.address.port(), 5000);
        assert!(crate::config::validate(&config).is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/relayd.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[timeouts]\nlogin = \"soon\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
