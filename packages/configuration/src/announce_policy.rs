use serde::{Deserialize, Serialize};

/// Controls the announce interval handed back to clients and the default/max
/// `numwant` enforced by the sanitize hook.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct AnnouncePolicy {
    /// Seconds a client should wait between announces.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// `numwant` used when the client omits the parameter.
    #[serde(default = "AnnouncePolicy::default_numwant")]
    pub default_numwant: u32,

    /// Upper bound a requested `numwant` is clamped to.
    #[serde(default = "AnnouncePolicy::default_max_numwant")]
    pub max_numwant: u32,
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        120
    }

    fn default_numwant() -> u32 {
        50
    }

    fn default_max_numwant() -> u32 {
        100
    }
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            default_numwant: Self::default_numwant(),
            max_numwant: Self::default_max_numwant(),
        }
    }
}
