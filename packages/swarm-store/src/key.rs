use glowworm_primitives::{InfoHash, IpVersion};

/// Identifies one swarm: a torrent's peers of one address family.
///
/// IPv4 and IPv6 peers for the same torrent are kept in separate swarms so a
/// compact peer list never has to mix 6-byte and 18-byte records, and so an
/// IPv4-only client is never handed IPv6 peers it can't connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwarmKey {
    pub info_hash: InfoHash,
    pub ip_version: IpVersion,
}

impl SwarmKey {
    #[must_use]
    pub fn new(info_hash: InfoHash, ip_version: IpVersion) -> Self {
        Self { info_hash, ip_version }
    }

    /// Routes a key to one of `shard_count` shards using the first 4 bytes
    /// of the info-hash, chosen so the distribution doesn't depend on the
    /// address family and every info-hash byte eventually participates in
    /// some tracker's shard count as `shard_count` is tuned.
    #[must_use]
    pub fn shard_index(&self, shard_count: usize) -> usize {
        let bytes = self.info_hash.bytes();
        let prefix = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        (prefix as usize) % shard_count
    }
}
