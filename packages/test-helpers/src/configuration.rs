//! Tracker configuration factories for testing.
use glowworm_configuration::{ClientApprovalConfig, Configuration, HookConfig};

/// Configuration for testing. Frontends bind to port `0` (OS-assigned) so
/// multiple trackers can run concurrently without colliding, and logging is
/// silenced unless overridden.
///
/// > **NOTICE**: not meant to be used in production.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut config = Configuration {
        log_level: String::from("off"),
        ..Default::default()
    };

    config.udp.enabled = true;
    config.udp.bind_address = String::from("127.0.0.1:0");

    config.http.enabled = true;
    config.http.bind_address = String::from("127.0.0.1:0");

    config
}

/// Ephemeral configuration using a wildcard IPv6 bind address for the UDP and
/// HTTP frontends.
#[must_use]
pub fn ephemeral_ipv6() -> Configuration {
    let mut config = ephemeral();

    config.udp.bind_address = String::from("[::1]:0");
    config.http.bind_address = String::from("[::1]:0");

    config
}

/// Ephemeral configuration with both frontends disabled.
#[must_use]
pub fn ephemeral_with_no_frontends() -> Configuration {
    let mut config = ephemeral();

    config.udp.enabled = false;
    config.http.enabled = false;

    config
}

/// Ephemeral configuration with a single `ClientApproval` pre-hook
/// whitelisting the given 6-byte client-id prefixes (as hex strings).
#[must_use]
pub fn ephemeral_with_client_whitelist(whitelist: Vec<String>) -> Configuration {
    let mut config = ephemeral();

    config.prehooks.push(HookConfig {
        name: String::from("client approval"),
        config: toml::Value::try_from(ClientApprovalConfig { whitelist, blacklist: Vec::new() })
            .expect("client approval config always serializes to TOML"),
    });

    config
}

#[cfg(test)]
mod tests {
    use super::{ephemeral, ephemeral_ipv6, ephemeral_with_client_whitelist, ephemeral_with_no_frontends};

    #[test]
    fn an_ephemeral_configuration_binds_both_frontends_to_an_os_assigned_port() {
        let config = ephemeral();

        assert!(config.udp.enabled);
        assert!(config.http.enabled);
        assert!(config.udp.bind_address.ends_with(":0"));
        assert!(config.http.bind_address.ends_with(":0"));
    }

    #[test]
    fn an_ephemeral_ipv6_configuration_uses_bracketed_addresses() {
        let config = ephemeral_ipv6();

        assert!(config.udp.bind_address.starts_with('['));
        assert!(config.http.bind_address.starts_with('['));
    }

    #[test]
    fn ephemeral_with_no_frontends_disables_both() {
        let config = ephemeral_with_no_frontends();

        assert!(!config.udp.enabled);
        assert!(!config.http.enabled);
    }

    #[test]
    fn ephemeral_with_client_whitelist_adds_a_single_prehook() {
        let config = ephemeral_with_client_whitelist(vec!["aabbccddeeff".to_string()]);

        assert_eq!(config.prehooks.len(), 1);
        assert_eq!(config.prehooks[0].name, "client approval");
    }
}
