//! Resolves configuration from the environment, per
//! [`glowworm_configuration::Info`]'s inline-TOML-then-file precedence.
use glowworm_configuration::{ConfigError, Configuration, Info};

const ENV_VAR_CONFIG: &str = "GLOWWORM_TRACKER_CONFIG";
const ENV_VAR_PATH_CONFIG: &str = "GLOWWORM_TRACKER_CONFIG_PATH";
const DEFAULT_PATH_CONFIG: &str = "./glowworm-tracker.toml";

/// # Errors
///
/// Returns `Err` if no configuration source resolves, or the resolved
/// source fails to parse.
pub fn load() -> Result<Configuration, ConfigError> {
    let info = Info::new(ENV_VAR_CONFIG, ENV_VAR_PATH_CONFIG, DEFAULT_PATH_CONFIG)?;
    Configuration::load(&info)
}
