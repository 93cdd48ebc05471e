use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

/// Configuration for the UDP tracker frontend.
#[serde_as]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct UdpTracker {
    /// Whether the UDP tracker is enabled.
    #[serde(default = "UdpTracker::default_enabled")]
    pub enabled: bool,

    /// Address to bind the UDP socket to, `ip:port`.
    #[serde(default = "UdpTracker::default_bind_address")]
    pub bind_address: String,

    /// Maximum accepted clock skew, in seconds, for connection-id time buckets.
    #[serde(default = "UdpTracker::default_max_clock_skew")]
    pub max_clock_skew: u64,

    /// HMAC secret used to derive connection-ids. Left unset, the bootstrap
    /// routine generates an ephemeral one at startup (connection-ids then do
    /// not survive a restart).
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub private_key: Option<String>,
}

impl UdpTracker {
    fn default_enabled() -> bool {
        false
    }

    fn default_bind_address() -> String {
        String::from("0.0.0.0:6969")
    }

    fn default_max_clock_skew() -> u64 {
        0
    }
}

impl Default for UdpTracker {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            bind_address: Self::default_bind_address(),
            max_clock_skew: Self::default_max_clock_skew(),
            private_key: None,
        }
    }
}
