use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

/// Configuration for the HTTP tracker frontend.
#[serde_as]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct HttpTracker {
    /// Whether the HTTP tracker is enabled.
    #[serde(default = "HttpTracker::default_enabled")]
    pub enabled: bool,

    /// Address to bind the HTTP listener to, `ip:port`.
    #[serde(default = "HttpTracker::default_bind_address")]
    pub bind_address: String,

    /// Read timeout, in milliseconds, applied per request.
    #[serde(default = "HttpTracker::default_read_timeout")]
    pub read_timeout_ms: u64,

    /// Write timeout, in milliseconds, applied per response.
    #[serde(default = "HttpTracker::default_write_timeout")]
    pub write_timeout_ms: u64,

    /// When `true`, trusts `real_ip_header` over the socket's peer address.
    #[serde(default = "HttpTracker::default_allow_ip_spoofing")]
    pub allow_ip_spoofing: bool,

    /// Header consulted for the client IP when `allow_ip_spoofing` is set.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub real_ip_header: Option<String>,

    /// Path to the TLS certificate. Only used if both TLS paths are set.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub tls_cert_path: Option<String>,

    /// Path to the TLS key. Only used if both TLS paths are set.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub tls_key_path: Option<String>,
}

impl HttpTracker {
    fn default_enabled() -> bool {
        false
    }

    fn default_bind_address() -> String {
        String::from("0.0.0.0:7070")
    }

    fn default_read_timeout() -> u64 {
        5000
    }

    fn default_write_timeout() -> u64 {
        5000
    }

    fn default_allow_ip_spoofing() -> bool {
        false
    }

    /// Whether both TLS cert and key paths are configured.
    #[must_use]
    pub fn tls_enabled(&self) -> bool {
        self.tls_cert_path.is_some() && self.tls_key_path.is_some()
    }
}

impl Default for HttpTracker {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            bind_address: Self::default_bind_address(),
            read_timeout_ms: Self::default_read_timeout(),
            write_timeout_ms: Self::default_write_timeout(),
            allow_ip_spoofing: Self::default_allow_ip_spoofing(),
            real_ip_header: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}
