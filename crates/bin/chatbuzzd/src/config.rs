//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `chatbuzz.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device server settings.
    pub intiface: IntifaceConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Trigger persistence settings.
    pub triggers: TriggersConfig,
    /// Sender authorization settings.
    pub authorization: AuthorizationConfig,
}

/// Intiface server location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntifaceConfig {
    /// Host name or address of the device server.
    pub host: String,
    /// TCP port of the device server.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Trigger persistence configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TriggersConfig {
    /// File to preload triggers from at startup, if any.
    pub file: Option<String>,
}

/// Sender authorization configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Initial authorized-sender substring, if any.
    pub user: Option<String>,
}

impl Config {
    /// Load configuration from `chatbuzz.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("chatbuzz.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CHATBUZZ_SERVER") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.intiface.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.intiface.port = port;
                }
            } else {
                self.intiface.host = val;
            }
        }
        if let Ok(val) = std::env::var("CHATBUZZ_TRIGGER_FILE") {
            self.triggers.file = Some(val);
        }
        if let Ok(val) = std::env::var("CHATBUZZ_USER") {
            self.authorization.user = Some(val);
        }
        if let Ok(val) = std::env::var("CHATBUZZ_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.intiface.host.is_empty() {
            return Err(ConfigError::Validation("host must not be empty".to_string()));
        }
        if self.intiface.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Return the `host:port` device server target.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}:{}", self.intiface.host, self.intiface.port)
    }
}

impl Default for IntifaceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: chatbuzz_app::session::DEFAULT_PORT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "chatbuzzd=info,chatbuzz=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.intiface.host, "localhost");
        assert_eq!(config.intiface.port, 12345);
        assert!(config.triggers.file.is_none());
        assert!(config.authorization.user.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.intiface.port, 12345);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [intiface]
            host = '192.168.1.20'
            port = 6969

            [logging]
            filter = 'debug'

            [triggers]
            file = 'triggers.txt'

            [authorization]
            user = 'Alice'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.intiface.host, "192.168.1.20");
        assert_eq!(config.intiface.port, 6969);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.triggers.file.as_deref(), Some("triggers.txt"));
        assert_eq!(config.authorization.user.as_deref(), Some("Alice"));
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [intiface]
            port = 6969
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.intiface.host, "localhost");
        assert_eq!(config.intiface.port, 6969);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.intiface.port, 12345);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.intiface.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_host() {
        let mut config = Config::default();
        config.intiface.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_target() {
        let config = Config::default();
        assert_eq!(config.target(), "localhost:12345");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
