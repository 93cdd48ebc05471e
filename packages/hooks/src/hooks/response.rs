use glowworm_primitives::peer::Peer;
use glowworm_swarm_store::{StoreError, SwarmStore};

use crate::error::ClientError;
use crate::pipeline::{AnnounceRequest, AnnounceResponse};

#[cfg(not(test))]
type CurrentClock = glowworm_clock::clock::Working;
#[cfg(test)]
type CurrentClock = glowworm_clock::clock::Stopped;

/// Always the last pre-hook for announce: reads the store and populates the
/// response's peer counts and peer list.
///
/// A swarm of one — the announcer is the only peer the store has ever
/// seen for this info-hash and address family — has no existing swarm entry
/// to read; in that case the response is synthesized by crediting the
/// announcer itself into whichever count it belongs to, and handing the
/// announcer its own entry back (there's no one else to hand back).
pub fn call(store: &SwarmStore, req: &AnnounceRequest, num_want: usize, resp: &mut AnnounceResponse) -> Result<(), ClientError> {
    use glowworm_clock::clock::Time;

    let ip_version = req.ip_version();
    let metadata = store.scrape_swarm(req.info_hash, ip_version).map_err(|_| ClientError::ResourceDoesNotExist)?;
    resp.complete = metadata.complete;
    resp.incomplete = metadata.incomplete;

    match store.announce_peers(req.info_hash, ip_version, req.is_seeder(), num_want, &req.peer_addr) {
        Ok(peers) => {
            resp.peers = peers;
            Ok(())
        }
        Err(StoreError::ResourceDoesNotExist) => {
            if req.is_seeder() {
                resp.complete = resp.complete.max(1);
            } else {
                resp.incomplete = resp.incomplete.max(1);
            }
            resp.peers = vec![std::sync::Arc::new(Peer {
                peer_id: req.peer_id,
                peer_addr: req.peer_addr,
                updated: CurrentClock::now(),
                uploaded: aquatic_udp_protocol::NumberOfBytes::new(req.uploaded),
                downloaded: aquatic_udp_protocol::NumberOfBytes::new(req.downloaded),
                left: aquatic_udp_protocol::NumberOfBytes::new(req.left),
                event: req.event,
            })];
            Ok(())
        }
        Err(StoreError::Stopped) => Err(ClientError::ResourceDoesNotExist),
    }
}
