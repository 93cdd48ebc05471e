//! Configuration data structures for `glowworm-tracker`.
//!
//! Configuration is loaded from a [TOML](https://toml.io/en/) file, or from
//! the `GLOWWORM_TRACKER_CONFIG` environment variable holding the same TOML
//! content, with individual keys overridable via
//! `GLOWWORM_TRACKER_CONFIG_OVERRIDE_*` environment variables. Any key not
//! supplied falls back to its documented default, so an empty file is a
//! valid (if minimal) configuration.
//!
//! ## Sections
//!
//! - [`AnnouncePolicy`] — the announce interval and `numwant` bounds.
//! - [`Storage`] — swarm-store sizing and peer lifetime.
//! - [`UdpTracker`] / [`HttpTracker`] — per-frontend listener settings.
//! - [`HookConfig`] — one entry of the ordered `prehooks`/`posthooks` lists.
//!
//! ## Default configuration
//!
//! ```toml
//! log_level = "info"
//!
//! [announce_policy]
//! interval = 120
//! default_numwant = 50
//! max_numwant = 100
//!
//! [storage]
//! shard_count = 1024
//! peer_lifetime = 900
//! gc_interval = 600
//!
//! [udp]
//! enabled = false
//! bind_address = "0.0.0.0:6969"
//! max_clock_skew = 0
//!
//! [http]
//! enabled = false
//! bind_address = "0.0.0.0:7070"
//! read_timeout_ms = 5000
//! write_timeout_ms = 5000
//! allow_ip_spoofing = false
//!
//! prehooks = []
//! posthooks = []
//! ```
pub mod announce_policy;
pub mod hooks;
pub mod http_tracker;
pub mod storage;
pub mod udp_tracker;

use std::{env, fs};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use glowworm_located_error::{DynError, Located, LocatedError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use announce_policy::AnnouncePolicy;
pub use hooks::{ClientApprovalConfig, HookConfig, JwtConfig, VarintervalConfig};
pub use http_tracker::HttpTracker;
pub use storage::Storage;
pub use udp_tracker::UdpTracker;

/// Prefix for env vars that override individual configuration keys.
const CONFIG_OVERRIDE_PREFIX: &str = "GLOWWORM_TRACKER_CONFIG_OVERRIDE_";
/// Path separator in override env var names for nested values.
const CONFIG_OVERRIDE_SEPARATOR: &str = "__";

/// The fully assembled tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct Configuration {
    /// Log level consumed by the bootstrap's `tracing-subscriber` init.
    #[serde(default = "Configuration::default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub announce_policy: AnnouncePolicy,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default)]
    pub udp: UdpTracker,

    #[serde(default)]
    pub http: HttpTracker,

    /// Pre-hooks, run in order before the response is built.
    #[serde(default)]
    pub prehooks: Vec<HookConfig>,

    /// Post-hooks, run in order after the response is built.
    #[serde(default)]
    pub posthooks: Vec<HookConfig>,
}

impl Configuration {
    fn default_log_level() -> String {
        String::from("info")
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            announce_policy: AnnouncePolicy::default(),
            storage: Storage::default(),
            udp: UdpTracker::default(),
            http: HttpTracker::default(),
            prehooks: Vec::new(),
            posthooks: Vec::new(),
        }
    }
}

impl Configuration {
    /// Loads configuration from the source described by `info`, layering
    /// defaults, then the TOML source, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the TOML source is malformed or a value fails to
    /// deserialize into its target type.
    pub fn load(info: &Info) -> Result<Configuration, ConfigError> {
        let figment = if let Some(config_toml) = &info.config_toml {
            Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::string(config_toml))
        } else {
            Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::file(&info.config_toml_path))
        }
        .merge(Env::prefixed(CONFIG_OVERRIDE_PREFIX).split(CONFIG_OVERRIDE_SEPARATOR));

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Saves this configuration to `path` in TOML form.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file cannot be written.
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let toml = toml::to_string(self).expect("configuration always serializes to TOML");
        fs::write(path, toml).map_err(|e| ConfigError::Io {
            source: (std::sync::Arc::new(e) as DynError).into(),
        })
    }
}

/// Describes where to load configuration from: an inline TOML string (env
/// var) takes priority over a file path.
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Resolves the configuration source from the environment: `env_var_config`
    /// is checked first for an inline TOML document, falling back to the path
    /// named by `env_var_path_config`, falling back to `default_path_config`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if neither the inline env var nor a file at the resolved
    /// path exists.
    pub fn new(env_var_config: &str, env_var_path_config: &str, default_path_config: &str) -> Result<Self, ConfigError> {
        if let Ok(config_toml) = env::var(env_var_config) {
            return Ok(Self {
                config_toml: Some(config_toml),
                config_toml_path: String::new(),
            });
        }

        let config_toml_path = env::var(env_var_path_config).unwrap_or_else(|_| default_path_config.to_string());

        if !std::path::Path::new(&config_toml_path).exists() {
            return Err(ConfigError::Io {
                source: (std::sync::Arc::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no configuration file at `{config_toml_path}`"),
                )) as DynError)
                    .into(),
            });
        }

        Ok(Self {
            config_toml: None,
            config_toml_path,
        })
    }
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file I/O failed: {source}")]
    Io {
        source: LocatedError<'static, dyn std::error::Error + Send + Sync>,
    },

    #[error("failed processing configuration: {source}")]
    Figment { source: LocatedError<'static, figment::Error> },
}

impl From<figment::Error> for ConfigError {
    #[track_caller]
    fn from(err: figment::Error) -> Self {
        Self::Figment { source: Located(err).into() }
    }
}

#[cfg(test)]
mod tests {
    use super::{Configuration, Info};

    #[test]
    fn configuration_should_have_sensible_defaults() {
        let configuration = Configuration::default();

        assert_eq!(configuration.log_level, "info");
        assert_eq!(configuration.announce_policy.interval, 120);
        assert_eq!(configuration.storage.shard_count, 1024);
        assert!(!configuration.udp.enabled);
        assert!(!configuration.http.enabled);
        assert!(configuration.prehooks.is_empty());
    }

    #[test]
    fn an_empty_configuration_source_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let info = Info {
                config_toml: Some(String::new()),
                config_toml_path: String::new(),
            };

            let configuration = Configuration::load(&info).expect("default configuration should load");

            assert_eq!(configuration, Configuration::default());

            Ok(())
        });
    }

    #[test]
    fn a_toml_source_overrides_individual_keys() {
        figment::Jail::expect_with(|_jail| {
            let config_toml = r#"
                log_level = "debug"

                [storage]
                shard_count = 64
            "#
            .to_string();

            let info = Info {
                config_toml: Some(config_toml),
                config_toml_path: String::new(),
            };

            let configuration = Configuration::load(&info).expect("configuration should load");

            assert_eq!(configuration.log_level, "debug");
            assert_eq!(configuration.storage.shard_count, 64);
            assert_eq!(configuration.storage.peer_lifetime, Configuration::default().storage.peer_lifetime);

            Ok(())
        });
    }

    #[test]
    fn an_env_var_overrides_a_nested_key() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GLOWWORM_TRACKER_CONFIG_OVERRIDE_STORAGE__SHARD_COUNT", "32");

            let info = Info {
                config_toml: Some(String::new()),
                config_toml_path: String::new(),
            };

            let configuration = Configuration::load(&info).expect("configuration should load");

            assert_eq!(configuration.storage.shard_count, 32);

            Ok(())
        });
    }

    #[test]
    fn info_falls_back_from_the_inline_env_var_to_a_configuration_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("tracker.toml", "log_level = \"trace\"")?;

            let info = Info::new("GLOWWORM_TRACKER_CONFIG_NOT_SET", "GLOWWORM_TRACKER_CONFIG_PATH_NOT_SET", "tracker.toml")
                .expect("configuration file should be found");

            let configuration = Configuration::load(&info).expect("configuration should load");

            assert_eq!(configuration.log_level, "trace");

            Ok(())
        });
    }

    #[test]
    fn info_fails_when_no_inline_config_and_no_file_exist() {
        figment::Jail::expect_with(|_jail| {
            let result = Info::new(
                "GLOWWORM_TRACKER_CONFIG_NOT_SET",
                "GLOWWORM_TRACKER_CONFIG_PATH_NOT_SET",
                "does-not-exist.toml",
            );

            assert!(result.is_err());

            Ok(())
        });
    }
}
