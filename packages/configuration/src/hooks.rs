use serde::{Deserialize, Serialize};

/// One entry of an ordered `prehooks`/`posthooks` list: a recognized hook
/// name plus its hook-specific configuration table.
///
/// The name is resolved to a concrete hook type by the bootstrap routine;
/// this crate only carries the raw table so it stays agnostic of which
/// hooks exist. Recognized names: `client approval`, `jwt`, `interval
/// variation`.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct HookConfig {
    pub name: String,
    #[serde(default = "default_hook_config_value")]
    pub config: toml::Value,
}

fn default_hook_config_value() -> toml::Value {
    toml::Value::Table(toml::value::Table::new())
}

impl HookConfig {
    /// Deserializes this hook's configuration table into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the table's shape does not match `T`.
    pub fn parse<T>(&self) -> Result<T, toml::de::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        self.config.clone().try_into()
    }
}

/// Configuration for the `ClientApproval` hook: a whitelist XOR blacklist of
/// 6-byte client-id prefixes, given as hex strings.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct ClientApprovalConfig {
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// Configuration for the `Jwt` hook.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub jwk_set_url: url::Url,
    /// Seconds between JWK-set refreshes.
    pub refresh_interval: u64,
}

/// Configuration for the `Varinterval` hook.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct VarintervalConfig {
    /// Probability, in `(0,1]`, that a given announce has its interval bumped.
    pub modify_response_probability: f64,
    /// Upper bound, in seconds, of the sampled increase.
    pub max_increase_delta: u32,
    /// Whether `min_interval` is bumped the same way as `interval`.
    pub modify_min_interval: bool,
}

#[cfg(test)]
mod tests {
    use super::{ClientApprovalConfig, HookConfig};

    #[test]
    fn a_hook_configs_table_parses_into_its_concrete_config_type() {
        let hook = HookConfig {
            name: "client approval".to_string(),
            config: toml::Value::try_from(ClientApprovalConfig {
                whitelist: vec!["aabbccddeeff".to_string()],
                blacklist: vec![],
            })
            .unwrap(),
        };

        let parsed: ClientApprovalConfig = hook.parse().unwrap();

        assert_eq!(parsed.whitelist, vec!["aabbccddeeff".to_string()]);
    }
}
