//! Primitive types shared by the `glowworm` tracker crates: info-hashes,
//! peer identity, the canonical [`AnnounceEvent`], and the byte-string keys
//! used to index peers inside a swarm.
use std::net::SocketAddr;

pub mod announce_event;
pub mod info_hash;
pub mod peer;

pub use announce_event::AnnounceEvent;
pub use info_hash::InfoHash;

/// A timestamp measured as the duration elapsed since the Unix epoch.
///
/// Kept as a type alias (rather than a newtype) so it composes directly with
/// [`std::time::Duration`]'s arithmetic, matching how the clock crate treats
/// time throughout this workspace.
pub type DurationSinceUnixEpoch = std::time::Duration;

/// Address family of a peer or swarm: IPv4 and IPv6 peers are tracked in
/// separate swarms so that compact peer lists never need to mix encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    #[must_use]
    pub fn of(addr: &SocketAddr) -> Self {
        if addr.is_ipv4() {
            IpVersion::V4
        } else {
            IpVersion::V6
        }
    }
}

/// The first 6 bytes of a peer id, used by the client-approval hook to
/// identify the announcing client's software regardless of its instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub [u8; 6]);

impl ClientId {
    #[must_use]
    pub fn from_peer_id(peer_id: &peer::PeerId) -> Self {
        let mut prefix = [0u8; 6];
        prefix.copy_from_slice(&peer_id.0[..6]);
        ClientId(prefix)
    }
}

/// The byte string used as the map key for a peer inside one swarm's
/// seeder/leecher set: `peer_id ∥ port(be) ∥ ip`. Reusing the same key across
/// re-announces from the same peer means a re-announce updates the existing
/// entry instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerializedPeerKey(Vec<u8>);

impl SerializedPeerKey {
    #[must_use]
    pub fn new(peer_id: &peer::PeerId, addr: &SocketAddr) -> Self {
        let mut bytes = Vec::with_capacity(20 + 2 + 16);
        bytes.extend_from_slice(&peer_id.0);
        bytes.extend_from_slice(&addr.port().to_be_bytes());
        match addr.ip() {
            std::net::IpAddr::V4(ip) => bytes.extend_from_slice(&ip.octets()),
            std::net::IpAddr::V6(ip) => bytes.extend_from_slice(&ip.octets()),
        }
        SerializedPeerKey(bytes)
    }
}
