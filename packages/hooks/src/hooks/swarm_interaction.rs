use glowworm_primitives::peer::Peer;
use glowworm_primitives::{AnnounceEvent, DurationSinceUnixEpoch};
use glowworm_swarm_store::{StoreError, SwarmStore};

use crate::pipeline::AnnounceRequest;

#[cfg(not(test))]
type CurrentClock = glowworm_clock::clock::Working;
#[cfg(test)]
type CurrentClock = glowworm_clock::clock::Stopped;

/// Always the last post-hook: writes the announce's effect into the store.
/// Runs after the response has already been handed to the frontend, so a
/// failure here is logged by the caller rather than surfaced to the client.
pub fn call(store: &SwarmStore, req: &AnnounceRequest) -> Result<(), StoreError> {
    use glowworm_clock::clock::Time;

    let ip_version = req.ip_version();
    match req.event {
        AnnounceEvent::Stopped => match store.delete_peer(req.info_hash, ip_version, &req.peer_id, &req.peer_addr) {
            Ok(()) | Err(StoreError::ResourceDoesNotExist) => Ok(()),
            Err(err) => Err(err),
        },
        AnnounceEvent::Completed => store.graduate_leecher(req.info_hash, to_peer(req, CurrentClock::now())),
        _ if req.is_seeder() => store.put_seeder(req.info_hash, to_peer(req, CurrentClock::now())),
        _ => store.put_leecher(req.info_hash, to_peer(req, CurrentClock::now())),
    }
}

fn to_peer(req: &AnnounceRequest, now: DurationSinceUnixEpoch) -> Peer {
    Peer {
        peer_id: req.peer_id,
        peer_addr: req.peer_addr,
        updated: now,
        uploaded: aquatic_udp_protocol::NumberOfBytes::new(req.uploaded),
        downloaded: aquatic_udp_protocol::NumberOfBytes::new(req.downloaded),
        left: aquatic_udp_protocol::NumberOfBytes::new(req.left),
        event: req.event,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use glowworm_primitives::peer::PeerId;
    use glowworm_primitives::{AnnounceEvent, InfoHash};
    use glowworm_swarm_store::SwarmStore;

    use super::call;
    use crate::pipeline::AnnounceRequest;

    fn request(event: AnnounceEvent, left: i64) -> AnnounceRequest {
        AnnounceRequest {
            info_hash: InfoHash::from([0u8; 20]),
            peer_id: PeerId(*b"-gw0000000000000001a"),
            peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6881),
            uploaded: 0,
            downloaded: 0,
            left,
            event,
            num_want: 50,
            jwt: None,
        }
    }

    #[test]
    fn a_started_event_with_bytes_left_registers_a_leecher() {
        let store = SwarmStore::with_shard_count(4);
        call(&store, &request(AnnounceEvent::Started, 10)).unwrap();
        assert_eq!(
            store.scrape_swarm(InfoHash::from([0u8; 20]), glowworm_primitives::IpVersion::V4).unwrap().incomplete,
            1
        );
    }

    #[test]
    fn a_completed_event_graduates_the_peer_to_a_seeder() {
        let store = SwarmStore::with_shard_count(4);
        call(&store, &request(AnnounceEvent::Started, 10)).unwrap();
        call(&store, &request(AnnounceEvent::Completed, 0)).unwrap();
        let metadata = store.scrape_swarm(InfoHash::from([0u8; 20]), glowworm_primitives::IpVersion::V4).unwrap();
        assert_eq!(metadata.complete, 1);
        assert_eq!(metadata.downloaded, 1);
    }

    #[test]
    fn a_stopped_event_for_an_unknown_peer_is_not_an_error() {
        let store = SwarmStore::with_shard_count(4);
        call(&store, &request(AnnounceEvent::Stopped, 10)).unwrap();
    }
}
