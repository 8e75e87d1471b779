//! Configuration loading and management
//!
//! Configuration is resolved once at process start: a YAML file (optional)
//! provides the base values, then a handful of `CATALOG_*` environment
//! variables override them. The resulting [`AppConfig`] is passed explicitly
//! to whatever needs it.

use crate::core::error::{CatalogResult, ConfigError};
use crate::entities::discount::DiscountName;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> CatalogResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    field: "server.host".to_string(),
                    value: self.host.clone(),
                    message: e.to_string(),
                }
                .into()
            })
    }
}

/// Windows and discount used by the game lifecycle policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Games released this many months ago or earlier are purged
    pub purge_after_months: u32,
    /// Games older than this (and younger than the purge window) get the discount
    pub discount_after_months: u32,
    pub discount_name: DiscountName,
    /// Percent of the named discount to insert at startup, if any
    pub seed_discount_percent: Option<f64>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            purge_after_months: 18,
            discount_after_months: 12,
            discount_name: DiscountName::OldGame,
            seed_discount_percent: None,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> CatalogResult<()> {
        if self.purge_after_months == 0 || self.discount_after_months == 0 {
            return Err(invalid(
                "lifecycle",
                format!("{}/{}", self.purge_after_months, self.discount_after_months),
                "lifecycle windows must be at least one month",
            ));
        }
        if self.discount_after_months >= self.purge_after_months {
            return Err(invalid(
                "lifecycle.discount_after_months",
                self.discount_after_months.to_string(),
                "must be shorter than purge_after_months",
            ));
        }
        match self.seed_discount_percent {
            Some(percent) if !(0.0..=100.0).contains(&percent) => Err(invalid(
                "lifecycle.seed_discount_percent",
                percent.to_string(),
                "must be between 0 and 100",
            )),
            _ => Ok(()),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub lifecycle: LifecycleConfig,
    /// Default tracing filter; `RUST_LOG` takes precedence
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            lifecycle: LifecycleConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: display.clone(),
            },
            _ => ConfigError::IoError {
                message: format!("{}: {}", display, e),
            },
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(display),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Override values from `CATALOG_*` variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> CatalogResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CATALOG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CATALOG_PORT") {
            self.server.port = port.parse().map_err(|_| {
                invalid("CATALOG_PORT", port.clone(), "expected a port number")
            })?;
        }
        if let Some(level) = lookup("CATALOG_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Resolve the configuration once: file (if any), then the process environment
    pub fn load(path: Option<&str>) -> CatalogResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.lifecycle.validate()?;
        Ok(config)
    }
}

fn invalid(
    field: &str,
    value: impl Into<String>,
    message: &str,
) -> crate::core::error::CatalogError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.into(),
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.lifecycle.purge_after_months, 18);
        assert_eq!(config.lifecycle.discount_after_months, 12);
        assert_eq!(config.lifecycle.discount_name, DiscountName::OldGame);
        assert_eq!(config.log_level, "info");
        assert!(config.lifecycle.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
server:
  port: 8080
lifecycle:
  discount_after_months: 6
"#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.lifecycle.purge_after_months, 18);
        assert_eq!(config.lifecycle.discount_after_months, 6);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("OLDGAME"));
        assert_eq!(AppConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_discount_name_is_a_parse_error() {
        let err = AppConfig::from_yaml_str("lifecycle:\n  discount_name: NEWGAME\n").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_HOST", "127.0.0.1"),
            ("CATALOG_PORT", "4000"),
            ("CATALOG_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.addr().unwrap().to_string(), "127.0.0.1:4000");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_env_overlay_rejects_bad_port() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == "CATALOG_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CATALOG_PORT"));
    }

    #[test]
    fn test_lifecycle_windows_must_be_ordered() {
        let config = LifecycleConfig {
            discount_after_months: 18,
            ..LifecycleConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LifecycleConfig {
            purge_after_months: 0,
            ..LifecycleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_percent_bounds() {
        let config = LifecycleConfig {
            seed_discount_percent: Some(120.0),
            ..LifecycleConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
