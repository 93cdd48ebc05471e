//! Periodic sweep evicting peers that have gone quiet for longer than the
//! configured lifetime.
use std::sync::Arc;
use std::time::Duration;

use glowworm_clock::clock::Time;
use glowworm_swarm_store::SwarmStore;

#[cfg(not(test))]
type CurrentClock = glowworm_clock::clock::Working;
#[cfg(test)]
type CurrentClock = glowworm_clock::clock::Stopped;

/// Spawns a background task that calls [`SwarmStore::collect_garbage`] every
/// `gc_interval` seconds, evicting peers last seen more than `peer_lifetime`
/// seconds ago. Exits once the store is stopped.
pub fn spawn(store: Arc<SwarmStore>, gc_interval: Duration, peer_lifetime: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(gc_interval);
        loop {
            ticker.tick().await;
            if store.is_stopped() {
                break;
            }
            let cutoff = CurrentClock::now().saturating_sub(peer_lifetime);
            store.collect_garbage(cutoff).await;
        }
    })
}
