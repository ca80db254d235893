use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// Authorization metadata requirements
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AuthConfig {
  /// Reject calls that do not carry exactly one `authorization` entry
  #[serde(default)]
  pub enabled: bool,
}

/// PEM files used to serve over TLS
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TlsConfig {
  pub cert: PathBuf,
  pub key: PathBuf,
}

/// KVS server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
  /// Server listening address (gRPC)
  #[serde(default = "default_listen_addr")]
  pub listen_addr: String,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,

  #[serde(default)]
  pub auth: AuthConfig,

  /// Plaintext when absent
  #[serde(default)]
  pub tls: Option<TlsConfig>,
}

fn default_listen_addr() -> String {
  "0.0.0.0:4000".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      listen_addr: default_listen_addr(),
      log: LogConfig::default(),
      auth: AuthConfig::default(),
      tls: None,
    }
  }
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> Result<Self> {
    let config_str = fs::read_to_string(path).map_err(|e| Error::Config {
      path: path.to_string(),
      message: format!("failed to read: {}", e),
    })?;

    Self::from_toml(&config_str).map_err(|e| match e {
      Error::Config { message, .. } => Error::Config {
        path: path.to_string(),
        message,
      },
      other => other,
    })
  }

  /// Parse configuration from a TOML string
  pub fn from_toml(config_str: &str) -> Result<Self> {
    let config: Config = toml::from_str(config_str).map_err(|e| Error::Config {
      path: "<inline>".to_string(),
      message: format!("failed to parse: {}", e),
    })?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.listen_addr.is_empty() {
      return Err(Error::Config {
        path: "<inline>".to_string(),
        message: "listen_addr must not be empty".to_string(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.listen_addr, "0.0.0.0:4000");
    assert_eq!(config.log.level, "info");
    assert!(!config.auth.enabled);
    assert!(config.tls.is_none());
  }

  #[test]
  fn test_full_config() {
    let config_str = r#"
listen_addr = "127.0.0.1:4433"

[log]
level = "debug"
file = "/tmp/kvs.log"

[auth]
enabled = true

[tls]
cert = "etc/certs/server.pem"
key = "etc/certs/server-key.pem"
"#;

    let config = Config::from_toml(config_str).unwrap();
    assert_eq!(config.listen_addr, "127.0.0.1:4433");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log.file.as_deref(), Some("/tmp/kvs.log"));
    assert!(config.auth.enabled);
    let tls = config.tls.unwrap();
    assert_eq!(tls.cert, PathBuf::from("etc/certs/server.pem"));
    assert_eq!(tls.key, PathBuf::from("etc/certs/server-key.pem"));
  }

  #[test]
  fn test_invalid_config() {
    assert!(matches!(
      Config::from_toml("listen_addr = 4000"),
      Err(Error::Config { .. })
    ));
    assert!(matches!(
      Config::from_toml("listen_addr = \"\""),
      Err(Error::Config { .. })
    ));
  }

  #[test]
  fn test_missing_file() {
    match Config::from_file("/nonexistent/kvs.toml") {
      Err(Error::Config { path, .. }) => assert_eq!(path, "/nonexistent/kvs.toml"),
      other => panic!("expected config error, got {:?}", other),
    }
  }
}
