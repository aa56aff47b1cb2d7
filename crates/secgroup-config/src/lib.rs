//! Shared configuration for secgroup tools.
//!
//! TOML file + `SECGROUP_`-prefixed environment, layered over defaults with
//! `figment`, and translated into `secgroup_core::ManagerConfig` and a
//! `DefaultTrackingProvider`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use secgroup_core::ManagerConfig;
use secgroup_core::retry::MAX_RETRY_TIMEOUT;
use secgroup_core::tracking::{
    DEFAULT_CLUSTER_NAME, DEFAULT_LEGACY_TAG_KEYS, DEFAULT_TAG_PREFIX, DefaultTrackingProvider,
};

/// Environment variable prefix. Nested keys use `__`, e.g.
/// `SECGROUP_TRACKING__CLUSTER_NAME`.
pub const ENV_PREFIX: &str = "SECGROUP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no VPC configured (set vpc_id or SECGROUP_VPC_ID)")]
    MissingVpc,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// VPC owning every managed group.
    pub vpc_id: Option<String>,

    #[serde(default = "default_poll_interval_secs")]
    pub delete_poll_interval_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub delete_timeout_secs: u64,

    #[serde(default)]
    pub tracking: Tracking,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vpc_id: None,
            delete_poll_interval_secs: default_poll_interval_secs(),
            delete_timeout_secs: default_timeout_secs(),
            tracking: Tracking::default(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    secgroup_core::config::DEFAULT_DELETE_POLL_INTERVAL.as_secs()
}
fn default_timeout_secs() -> u64 {
    secgroup_core::config::DEFAULT_DELETE_TIMEOUT.as_secs()
}

/// Tracking-tag settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tracking {
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Overrides the `{tag_prefix}/cluster` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_tag_key: Option<String>,

    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    #[serde(default = "default_legacy_tag_keys")]
    pub legacy_tag_keys: Vec<String>,
}

impl Default for Tracking {
    fn default() -> Self {
        Self {
            tag_prefix: default_tag_prefix(),
            cluster_tag_key: None,
            cluster_name: default_cluster_name(),
            legacy_tag_keys: default_legacy_tag_keys(),
        }
    }
}

fn default_tag_prefix() -> String {
    DEFAULT_TAG_PREFIX.into()
}
fn default_cluster_name() -> String {
    DEFAULT_CLUSTER_NAME.into()
}
fn default_legacy_tag_keys() -> Vec<String> {
    DEFAULT_LEGACY_TAG_KEYS
        .iter()
        .map(|k| (*k).to_owned())
        .collect()
}

impl Config {
    /// Check value ranges. Does not require a VPC; see
    /// [`manager_config`](Self::manager_config).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delete_poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "delete_poll_interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.delete_timeout_secs < self.delete_poll_interval_secs {
            return Err(ConfigError::Validation {
                field: "delete_timeout_secs".into(),
                reason: format!(
                    "must be at least delete_poll_interval_secs ({})",
                    self.delete_poll_interval_secs
                ),
            });
        }
        if self.delete_timeout_secs > MAX_RETRY_TIMEOUT.as_secs() {
            return Err(ConfigError::Validation {
                field: "delete_timeout_secs".into(),
                reason: format!("must be at most {}", MAX_RETRY_TIMEOUT.as_secs()),
            });
        }
        if self.tracking.tag_prefix.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "tracking.tag_prefix".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Build the manager's runtime configuration.
    pub fn manager_config(&self) -> Result<ManagerConfig, ConfigError> {
        self.validate()?;
        let vpc_id = self
            .vpc_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVpc)?;
        Ok(ManagerConfig::new(vpc_id)
            .with_delete_poll_interval(Duration::from_secs(self.delete_poll_interval_secs))
            .with_delete_timeout(Duration::from_secs(self.delete_timeout_secs)))
    }

    /// Build the tracking provider described by `[tracking]`.
    pub fn tracking_provider(&self) -> DefaultTrackingProvider {
        let tracking = &self.tracking;
        let provider =
            DefaultTrackingProvider::new(tracking.tag_prefix.clone(), tracking.cluster_name.clone())
                .with_legacy_tag_keys(tracking.legacy_tag_keys.clone());
        match &tracking.cluster_tag_key {
            Some(key) => provider.with_cluster_tag_key(key.clone()),
            None => provider,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "secgroup", "secgroup").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("secgroup");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load from the canonical path + environment. A missing file is not an error.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment, then validate.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delete_poll_interval_secs, 2);
        assert_eq!(config.delete_timeout_secs, 120);
    }

    #[test]
    fn manager_config_requires_vpc() {
        let err = Config::default().manager_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVpc));
    }

    #[test]
    fn rejects_zero_interval() {
        let config = Config {
            delete_poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field, .. }) if field == "delete_poll_interval_secs"
        ));
    }

    #[test]
    fn rejects_timeout_shorter_than_interval() {
        let config = Config {
            delete_poll_interval_secs: 10,
            delete_timeout_secs: 5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_timeout_beyond_maximum() {
        let config = Config {
            delete_timeout_secs: u64::MAX,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field, .. }) if field == "delete_timeout_secs"
        ));
        let config = Config {
            vpc_id: Some("vpc-1".into()),
            ..config
        };
        assert!(config.manager_config().is_err());
    }

    #[test]
    fn accepts_timeout_at_maximum_and_uneven_interval() {
        let config = Config {
            vpc_id: Some("vpc-1".into()),
            delete_poll_interval_secs: 7,
            delete_timeout_secs: MAX_RETRY_TIMEOUT.as_secs(),
            ..Config::default()
        };
        let manager = config.manager_config().unwrap();
        assert_eq!(manager.delete_poll_interval, Duration::from_secs(7));
        assert_eq!(manager.delete_timeout, MAX_RETRY_TIMEOUT);
    }

    #[test]
    fn tracking_settings_reach_provider() {
        let mut config = Config::default();
        config.tracking.tag_prefix = "acme.dev".into();
        config.tracking.cluster_name = "east".into();
        let provider = config.tracking_provider();
        assert_eq!(provider.tag_prefix(), "acme.dev");
        assert_eq!(provider.cluster_name(), "east");
    }

    #[test]
    fn cluster_tag_key_override_reaches_provider() {
        use secgroup_core::{StackId, TrackingProvider};

        let mut config = Config::default();
        config.tracking.cluster_tag_key = Some("elbv2.k8s.aws/cluster".into());
        config.tracking.cluster_name = "east".into();
        let tags = config
            .tracking_provider()
            .stack_tags(&StackId::new("ns", "app"));
        assert_eq!(
            tags.get("elbv2.k8s.aws/cluster").map(String::as_str),
            Some("east")
        );
    }
}
