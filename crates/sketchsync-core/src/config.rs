//! Configuration loading and typed config structures.
//!
//! The configuration lives in `sketchsync.yaml` next to the daemon. Every
//! field has a default, so a missing file or a partial file is valid.
//! Environment variables override the listen address:
//!
//! - `PORT` overrides `server.port`
//! - `SKETCHSYNC_HOST` overrides `server.host`

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong type.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// The environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerSection,

    /// Long-poll ceiling.
    #[serde(default)]
    pub long_poll: LongPollConfig,

    /// Adaptive-poll delays.
    #[serde(default)]
    pub adaptive_poll: AdaptivePollConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Defaults plus environment overrides, for when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an override is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is not a valid port.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PORT") {
            self.server.port = value
                .trim()
                .parse::<u16>()
                .map_err(|_parse| ConfigError::InvalidEnv { var: "PORT", value })?;
        }
        if let Some(value) = lookup("SKETCHSYNC_HOST") {
            self.server.host = value;
        }
        Ok(())
    }
}

/// Listen address configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Long-poll configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LongPollConfig {
    /// Ceiling wait before replying with an empty batch.
    #[serde(default = "default_long_poll_timeout_ms")]
    pub timeout_ms: u64,
}

impl LongPollConfig {
    /// The ceiling as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LongPollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_long_poll_timeout_ms(),
        }
    }
}

/// Adaptive-poll configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AdaptivePollConfig {
    /// Pacing delay when the client is already behind at arrival.
    #[serde(default = "default_active_delay_ms")]
    pub active_delay_ms: u64,

    /// Backoff delay when nothing is pending at arrival.
    #[serde(default = "default_idle_delay_ms")]
    pub idle_delay_ms: u64,
}

impl AdaptivePollConfig {
    /// The active-mode delay as a [`Duration`].
    pub const fn active_delay(&self) -> Duration {
        Duration::from_millis(self.active_delay_ms)
    }

    /// The idle-mode delay as a [`Duration`].
    pub const fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}

impl Default for AdaptivePollConfig {
    fn default() -> Self {
        Self {
            active_delay_ms: default_active_delay_ms(),
            idle_delay_ms: default_idle_delay_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

const fn default_long_poll_timeout_ms() -> u64 {
    3000
}

const fn default_active_delay_ms() -> u64 {
    1000
}

const fn default_idle_delay_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_timings() {
        let config = SyncConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.long_poll.timeout(), Duration::from_millis(3000));
        assert_eq!(config.adaptive_poll.active_delay(), Duration::from_millis(1000));
        assert_eq!(config.adaptive_poll.idle_delay(), Duration::from_millis(5000));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8088
long_poll:
  timeout_ms: 2500
adaptive_poll:
  active_delay_ms: 250
  idle_delay_ms: 4000
logging:
  level: "debug"
"#;
        let config = SyncConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.long_poll.timeout_ms, 2500);
        assert_eq!(config.adaptive_poll.active_delay_ms, 250);
        assert_eq!(config.adaptive_poll.idle_delay_ms, 4000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SyncConfig::parse("long_poll:\n  timeout_ms: 10\n").unwrap();
        assert_eq!(config.long_poll.timeout_ms, 10);
        assert_eq!(config.adaptive_poll, AdaptivePollConfig::default());
        assert_eq!(config.server, ServerSection::default());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(SyncConfig::parse("").unwrap(), SyncConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SyncConfig::parse("long_poll: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn port_override_applies() {
        let mut config = SyncConfig::default();
        config
            .apply_overrides(|var| (var == "PORT").then(|| "4100".to_owned()))
            .unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = SyncConfig::default();
        let result = config.apply_overrides(|var| (var == "PORT").then(|| "http".to_owned()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { var: "PORT", .. })
        ));
    }
}
