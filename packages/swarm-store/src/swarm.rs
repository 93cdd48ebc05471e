use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use glowworm_primitives::peer::{Peer, ReadInfo};
use glowworm_primitives::{DurationSinceUnixEpoch, SerializedPeerKey};

/// One torrent's peers of one address family: disjoint seeder and leecher
/// sets, plus a counter of completed downloads that outlives any individual
/// peer's eviction.
///
/// Invariant: a peer id/address pair is never present in both `seeders` and
/// `leechers` at once — every mutating method below maintains this by
/// removing from the other set before inserting.
#[derive(Debug, Default, Clone)]
pub struct Swarm {
    seeders: HashMap<SerializedPeerKey, Arc<Peer>>,
    leechers: HashMap<SerializedPeerKey, Arc<Peer>>,
    downloaded: u64,
}

/// Aggregate counts returned by a scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwarmMetadata {
    pub complete: u32,
    pub incomplete: u32,
    pub downloaded: u32,
}

impl Swarm {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seeders.is_empty() && self.leechers.is_empty()
    }

    #[must_use]
    pub fn metadata(&self) -> SwarmMetadata {
        SwarmMetadata {
            complete: u32::try_from(self.seeders.len()).unwrap_or(u32::MAX),
            incomplete: u32::try_from(self.leechers.len()).unwrap_or(u32::MAX),
            downloaded: u32::try_from(self.downloaded).unwrap_or(u32::MAX),
        }
    }

    pub fn put_seeder(&mut self, peer: Peer) {
        let key = SerializedPeerKey::new(&peer.peer_id, &peer.peer_addr);
        self.leechers.remove(&key);
        self.seeders.insert(key, Arc::new(peer));
    }

    pub fn put_leecher(&mut self, peer: Peer) {
        let key = SerializedPeerKey::new(&peer.peer_id, &peer.peer_addr);
        self.seeders.remove(&key);
        self.leechers.insert(key, Arc::new(peer));
    }

    /// Removes a peer from `seeders`. Returns `false` if it wasn't there.
    pub fn delete_seeder(&mut self, key: &SerializedPeerKey) -> bool {
        self.seeders.remove(key).is_some()
    }

    /// Removes a peer from `leechers`. Returns `false` if it wasn't there.
    pub fn delete_leecher(&mut self, key: &SerializedPeerKey) -> bool {
        self.leechers.remove(key).is_some()
    }

    /// Removes the peer from both sets; used when an announce reports the
    /// `stopped` event, where it's immaterial which set it was in.
    pub fn delete_peer(&mut self, key: &SerializedPeerKey) -> bool {
        let removed_seeder = self.seeders.remove(key).is_some();
        let removed_leecher = self.leechers.remove(key).is_some();
        removed_seeder || removed_leecher
    }

    /// Moves a peer from `leechers` to `seeders`, incrementing the
    /// completed-download counter. A graduation of a peer the swarm has
    /// never seen before is equivalent to `put_seeder` plus the counter
    /// bump — there is nothing to "graduate from", but the download still
    /// completed from the tracker's point of view.
    pub fn graduate_leecher(&mut self, peer: Peer) {
        let key = SerializedPeerKey::new(&peer.peer_id, &peer.peer_addr);
        self.leechers.remove(&key);
        self.seeders.insert(key, Arc::new(peer));
        self.downloaded += 1;
    }

    /// Selects up to `num_want` peers for an announcing peer.
    ///
    /// Seeders only need leechers (they already have the complete file), so
    /// a seeder announce draws from `leechers` alone. A leecher draws from
    /// `seeders` first, then tops up from other `leechers`, always
    /// excluding the announcer itself.
    #[must_use]
    pub fn announce_peers(&self, announcer_is_seeder: bool, num_want: usize, announcer: &SocketAddr) -> Vec<Arc<Peer>> {
        if announcer_is_seeder {
            return take_excluding(self.leechers.values(), announcer, num_want);
        }

        let mut selected = take_excluding(self.seeders.values(), announcer, num_want);
        if selected.len() < num_want {
            let remaining = num_want - selected.len();
            selected.extend(take_excluding(self.leechers.values(), announcer, remaining));
        }
        selected
    }

    /// Deletes peers whose last announce is at or before `cutoff` from both
    /// sets. Returns the number removed.
    pub fn evict_inactive_peers(&mut self, cutoff: DurationSinceUnixEpoch) -> usize {
        let before = self.seeders.len() + self.leechers.len();
        self.seeders.retain(|_, peer| peer.updated() > cutoff);
        self.leechers.retain(|_, peer| peer.updated() > cutoff);
        before - (self.seeders.len() + self.leechers.len())
    }
}

fn take_excluding<'a>(
    peers: impl Iterator<Item = &'a Arc<Peer>>,
    exclude: &SocketAddr,
    limit: usize,
) -> Vec<Arc<Peer>> {
    peers
        .filter(|peer| &peer.peer_addr != exclude)
        .take(limit)
        .cloned()
        .collect()
}
