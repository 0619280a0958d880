//! Adapter configuration.
//!
//! Loaded from TOML and overridden by `BASICS_*` environment variables.

use crate::body::{DEFAULT_BODY_LIMIT, DEFAULT_QUERY_BODY_KEY};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicsConfig {
    /// Listen address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum size of a streamed request body, in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,

    /// Query key carrying a JSON body on `GET` requests.
    #[serde(default = "default_query_body_key")]
    pub query_body_key: String,

    /// Locale used when negotiation finds no match.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Default `tracing` filter, used when `RUST_LOG` is unset.
    #[serde(default = "default_log")]
    pub log: String,
}

impl Default for BasicsConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            body_limit: default_body_limit(),
            query_body_key: default_query_body_key(),
            default_locale: default_locale(),
            log: default_log(),
        }
    }
}

impl BasicsConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        Self::default().load_with_env_override()
    }

    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file(path)?.load_with_env_override()
    }

    /// Apply environment overrides:
    ///
    /// - `BASICS_BIND_ADDRESS`
    /// - `BASICS_PORT`
    /// - `BASICS_BODY_LIMIT`
    /// - `BASICS_QUERY_BODY_KEY`
    /// - `BASICS_DEFAULT_LOCALE`
    /// - `BASICS_LOG`
    pub fn load_with_env_override(self) -> Result<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(addr) = lookup("BASICS_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(port) = lookup("BASICS_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::EnvVar {
                name: "BASICS_PORT",
                reason: format!("expected a port number, got {port:?}"),
            })?;
        }
        if let Some(limit) = lookup("BASICS_BODY_LIMIT") {
            self.body_limit = limit.parse().map_err(|_| ConfigError::EnvVar {
                name: "BASICS_BODY_LIMIT",
                reason: format!("expected a byte count, got {limit:?}"),
            })?;
        }
        if let Some(key) = lookup("BASICS_QUERY_BODY_KEY") {
            self.query_body_key = key;
        }
        if let Some(locale) = lookup("BASICS_DEFAULT_LOCALE") {
            self.default_locale = locale;
        }
        if let Some(log) = lookup("BASICS_LOG") {
            self.log = log;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.body_limit == 0 {
            return Err(ConfigError::Validation(
                "body_limit must be greater than 0".to_string(),
            ));
        }
        if self.query_body_key.is_empty() {
            return Err(ConfigError::Validation(
                "query_body_key must not be empty".to_string(),
            ));
        }
        if self.default_locale.is_empty() {
            return Err(ConfigError::Validation(
                "default_locale must not be empty".to_string(),
            ));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_address, self.port);
        addr.parse()
            .map_err(|_| ConfigError::Validation(format!("invalid listen address {addr:?}")))
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_query_body_key() -> String {
    DEFAULT_QUERY_BODY_KEY.to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_log() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BasicsConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.body_limit, 1024 * 1024);
        assert_eq!(config.query_body_key, "body");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:3000".parse().unwrap()
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BasicsConfig::from_toml("port = 8080\nquery_body_key = \"q\"").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.query_body_key, "q");
        assert_eq!(config.default_locale, "en");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_address = \"0.0.0.0\"\nbody_limit = 512").unwrap();

        let config = BasicsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.body_limit, 512);
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("BASICS_PORT", "9000"),
            ("BASICS_DEFAULT_LOCALE", "es"),
        ]);
        let config = BasicsConfig::default()
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.default_locale, "es");
    }

    #[test]
    fn test_invalid_env_value() {
        let result = BasicsConfig::default()
            .apply_overrides(|name| (name == "BASICS_PORT").then(|| "http".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::EnvVar { name: "BASICS_PORT", .. })
        ));
    }

    #[test]
    fn test_validation() {
        let config = BasicsConfig {
            body_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BasicsConfig {
            bind_address: "not an ip".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
