use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glowworm_primitives::peer::{Peer, PeerId};
use glowworm_primitives::{DurationSinceUnixEpoch, InfoHash, IpVersion, SerializedPeerKey};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::key::SwarmKey;
use crate::swarm::{Swarm, SwarmMetadata};

const DEFAULT_SHARD_COUNT: usize = 1024;

type Shard = RwLock<HashMap<SwarmKey, Swarm>>;

/// A sharded, concurrently mutated table of every swarm the tracker knows
/// about.
///
/// Swarms are spread across a fixed array of shards, each independently
/// lockable, so an announce for one torrent never waits on a lock held for
/// an unrelated torrent. The shard for a given swarm is fixed for the
/// store's lifetime (see [`SwarmKey::shard_index`]), so a lookup never needs
/// to consult more than one shard.
pub struct SwarmStore {
    shards: Box<[Shard]>,
    stopped: AtomicBool,
}

impl SwarmStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shard_count(DEFAULT_SHARD_COUNT)
    }

    #[must_use]
    pub fn with_shard_count(shard_count: usize) -> Self {
        assert!(shard_count > 0, "a swarm store needs at least one shard");
        Self {
            shards: (0..shard_count).map(|_| RwLock::new(HashMap::new())).collect(),
            stopped: AtomicBool::new(false),
        }
    }

    fn shard_for(&self, key: &SwarmKey) -> &Shard {
        &self.shards[key.shard_index(self.shards.len())]
    }

    fn ensure_running(&self) -> Result<(), StoreError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(StoreError::Stopped);
        }
        Ok(())
    }

    pub fn put_seeder(&self, info_hash: InfoHash, peer: Peer) -> Result<(), StoreError> {
        self.ensure_running()?;
        let key = SwarmKey::new(info_hash, peer.ip_version());
        self.shard_for(&key).write().entry(key).or_default().put_seeder(peer);
        Ok(())
    }

    pub fn put_leecher(&self, info_hash: InfoHash, peer: Peer) -> Result<(), StoreError> {
        self.ensure_running()?;
        let key = SwarmKey::new(info_hash, peer.ip_version());
        self.shard_for(&key).write().entry(key).or_default().put_leecher(peer);
        Ok(())
    }

    pub fn graduate_leecher(&self, info_hash: InfoHash, peer: Peer) -> Result<(), StoreError> {
        self.ensure_running()?;
        let key = SwarmKey::new(info_hash, peer.ip_version());
        self.shard_for(&key)
            .write()
            .entry(key)
            .or_default()
            .graduate_leecher(peer);
        Ok(())
    }

    pub fn delete_seeder(
        &self,
        info_hash: InfoHash,
        ip_version: IpVersion,
        peer_id: &PeerId,
        addr: &SocketAddr,
    ) -> Result<(), StoreError> {
        self.remove(info_hash, ip_version, peer_id, addr, Swarm::delete_seeder)
    }

    pub fn delete_leecher(
        &self,
        info_hash: InfoHash,
        ip_version: IpVersion,
        peer_id: &PeerId,
        addr: &SocketAddr,
    ) -> Result<(), StoreError> {
        self.remove(info_hash, ip_version, peer_id, addr, Swarm::delete_leecher)
    }

    /// Removes a peer from whichever set it's in, regardless of whether it
    /// was known to be seeding or leeching. Used on an announce carrying the
    /// `stopped` event, where the caller doesn't track which set a peer was
    /// last placed in.
    pub fn delete_peer(
        &self,
        info_hash: InfoHash,
        ip_version: IpVersion,
        peer_id: &PeerId,
        addr: &SocketAddr,
    ) -> Result<(), StoreError> {
        self.remove(info_hash, ip_version, peer_id, addr, Swarm::delete_peer)
    }

    fn remove(
        &self,
        info_hash: InfoHash,
        ip_version: IpVersion,
        peer_id: &PeerId,
        addr: &SocketAddr,
        delete: impl FnOnce(&mut Swarm, &SerializedPeerKey) -> bool,
    ) -> Result<(), StoreError> {
        self.ensure_running()?;
        let key = SwarmKey::new(info_hash, ip_version);
        let peer_key = SerializedPeerKey::new(peer_id, addr);
        let mut shard = self.shard_for(&key).write();
        let Some(swarm) = shard.get_mut(&key) else {
            return Err(StoreError::ResourceDoesNotExist);
        };
        let removed = delete(swarm, &peer_key);
        if swarm.is_empty() {
            shard.remove(&key);
        }
        if removed {
            Ok(())
        } else {
            Err(StoreError::ResourceDoesNotExist)
        }
    }

    /// Selects up to `num_want` peers from the swarm to hand back in an
    /// announce response. Fails with [`StoreError::ResourceDoesNotExist`] if
    /// no swarm exists yet for this info-hash and address family.
    pub fn announce_peers(
        &self,
        info_hash: InfoHash,
        ip_version: IpVersion,
        announcer_is_seeder: bool,
        num_want: usize,
        announcer: &SocketAddr,
    ) -> Result<Vec<Arc<Peer>>, StoreError> {
        self.ensure_running()?;
        let key = SwarmKey::new(info_hash, ip_version);
        let shard = self.shard_for(&key).read();
        shard
            .get(&key)
            .map(|swarm| swarm.announce_peers(announcer_is_seeder, num_want, announcer))
            .ok_or(StoreError::ResourceDoesNotExist)
    }

    /// Returns the `complete`/`incomplete`/`downloaded` counts for a scrape.
    /// A torrent the store has never seen scrapes to all zeros, matching the
    /// wire behavior of a scrape for an unknown info-hash.
    ///
    /// # Errors
    ///
    /// Returns `Err(StoreError::Stopped)` once the store has been stopped,
    /// like every other operation here.
    pub fn scrape_swarm(&self, info_hash: InfoHash, ip_version: IpVersion) -> Result<SwarmMetadata, StoreError> {
        self.ensure_running()?;
        let key = SwarmKey::new(info_hash, ip_version);
        Ok(self.shard_for(&key).read().get(&key).map(Swarm::metadata).unwrap_or_default())
    }

    /// Walks every shard evicting peers whose last announce is at or before
    /// `cutoff`, removing swarms left empty, and yielding between shards so
    /// a long sweep never holds any one shard's write lock for longer than
    /// it takes to clean that shard alone.
    ///
    /// Each shard is processed in two phases: first a read-locked pass
    /// decides which swarms need touching, then a write-locked pass performs
    /// the mutation. This keeps the write lock window proportional to the
    /// number of stale entries in that shard rather than the shard's full
    /// size.
    pub async fn collect_garbage(&self, cutoff: DurationSinceUnixEpoch) -> usize {
        let mut total_removed = 0;
        for shard in &*self.shards {
            let candidates: Vec<SwarmKey> = shard.read().keys().copied().collect();

            if candidates.is_empty() {
                tokio::task::yield_now().await;
                continue;
            }

            let mut guard = shard.write();
            for key in candidates {
                if let Some(swarm) = guard.get_mut(&key) {
                    total_removed += swarm.evict_inactive_peers(cutoff);
                    if swarm.is_empty() {
                        guard.remove(&key);
                    }
                }
            }
            drop(guard);
            tokio::task::yield_now().await;
        }
        tracing::debug!(total_removed, "garbage collection swept all shards");
        total_removed
    }

    /// Stops the store: every subsequent mutating or reading call returns
    /// [`StoreError::Stopped`]. Idempotent only in the sense that it always
    /// succeeds; a second call is a no-op since the store is already marked
    /// stopped.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        tracing::info!("swarm store stopped");
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    #[cfg(test)]
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl Default for SwarmStore {
    fn default() -> Self {
        Self::new()
    }
}
