//! Stateless connection-id issuance and validation for the UDP frontend.
//!
//! The server never remembers which clients have connected. A connection-id
//! is a truncated HMAC over `(client-ip, time-bucket)`, keyed by a server
//! [`Secret`]; recomputing it for the current and previous 2-minute bucket
//! is enough to both issue and validate one, so no per-client state survives
//! between a connect and the announce/scrape that follows it.
use std::net::IpAddr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Width of one time bucket. A connection-id is accepted for up to two
/// adjacent buckets (current and previous), so its validity window is
/// `[BUCKET_SECONDS, 2 * BUCKET_SECONDS)`.
const BUCKET_SECONDS: u64 = 120;

type HmacSha256 = Hmac<Sha256>;

/// The server's HMAC key for connection-id issuance.
///
/// Kept as an opaque wrapper (rather than a bare `[u8; 32]`) so it can't be
/// accidentally logged or compared for equality the way a plain byte array
/// would be.
#[derive(Clone)]
pub struct Secret([u8; 32]);

impl Secret {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh random secret, used when no `udp.private_key` is
    /// configured: connection-ids remain valid within a single process
    /// lifetime but are invalidated by a restart.
    #[must_use]
    pub fn generate_random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parses a secret from a hex-encoded configuration string.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        binascii::hex2bin(hex.as_bytes(), &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

/// Issues and validates connection-ids. A trait so the UDP handler can be
/// tested against a deterministic implementation without going through the
/// clock.
pub trait ConnectionIdIssuer {
    fn issue(&self, client_ip: IpAddr, now_unix: u64) -> i64;
    fn is_valid(&self, connection_id: i64, client_ip: IpAddr, now_unix: u64) -> bool;
}

/// The HMAC-backed [`ConnectionIdIssuer`] used in production.
pub struct HmacConnectionIdIssuer {
    secret: Secret,
}

impl HmacConnectionIdIssuer {
    #[must_use]
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    fn mac_for_bucket(&self, client_ip: IpAddr, bucket: u64) -> i64 {
        let mut mac = HmacSha256::new_from_slice(&self.secret.0).expect("HMAC accepts a key of any length");
        match client_ip {
            IpAddr::V4(ip) => mac.update(&ip.octets()),
            IpAddr::V6(ip) => mac.update(&ip.octets()),
        }
        mac.update(&bucket.to_be_bytes());
        let digest = mac.finalize().into_bytes();
        i64::from_be_bytes(digest[..8].try_into().expect("digest is at least 8 bytes"))
    }
}

impl ConnectionIdIssuer for HmacConnectionIdIssuer {
    fn issue(&self, client_ip: IpAddr, now_unix: u64) -> i64 {
        self.mac_for_bucket(client_ip, now_unix / BUCKET_SECONDS)
    }

    fn is_valid(&self, connection_id: i64, client_ip: IpAddr, now_unix: u64) -> bool {
        let current_bucket = now_unix / BUCKET_SECONDS;
        let current = self.mac_for_bucket(client_ip, current_bucket);
        if connection_id == current {
            return true;
        }
        current_bucket > 0 && connection_id == self.mac_for_bucket(client_ip, current_bucket - 1)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{ConnectionIdIssuer, HmacConnectionIdIssuer, Secret, BUCKET_SECONDS};

    fn issuer() -> HmacConnectionIdIssuer {
        HmacConnectionIdIssuer::new(Secret::from_bytes([7u8; 32]))
    }

    #[test]
    fn a_freshly_issued_connection_id_validates_immediately() {
        let issuer = issuer();
        let ip = Ipv4Addr::new(10, 0, 0, 1).into();
        let id = issuer.issue(ip, 1_000_000);
        assert!(issuer.is_valid(id, ip, 1_000_000));
    }

    #[test]
    fn a_connection_id_is_rejected_for_a_different_client_ip() {
        let issuer = issuer();
        let a = Ipv4Addr::new(10, 0, 0, 1).into();
        let b = Ipv4Addr::new(10, 0, 0, 2).into();
        let id = issuer.issue(a, 1_000_000);
        assert!(!issuer.is_valid(id, b, 1_000_000));
    }

    #[test]
    fn a_connection_id_stays_valid_one_bucket_later() {
        let issuer = issuer();
        let ip = Ipv4Addr::new(10, 0, 0, 1).into();
        let id = issuer.issue(ip, 1_000_000);
        assert!(issuer.is_valid(id, ip, 1_000_000 + BUCKET_SECONDS));
    }

    #[test]
    fn a_connection_id_expires_after_two_buckets() {
        let issuer = issuer();
        let ip = Ipv4Addr::new(10, 0, 0, 1).into();
        let id = issuer.issue(ip, 1_000_000);
        assert!(!issuer.is_valid(id, ip, 1_000_000 + 2 * BUCKET_SECONDS));
    }

    #[test]
    fn parses_a_64_character_hex_secret() {
        assert!(Secret::from_hex(&"ab".repeat(32)).is_some());
        assert!(Secret::from_hex("not hex").is_none());
    }
}
