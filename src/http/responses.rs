//! Bencoded HTTP response bodies for `/announce` and `/scrape`.
use std::net::SocketAddr;
use std::sync::Arc;

use glowworm_bencode::{encode, Value};
use glowworm_hooks::{AnnounceResponse, ScrapeResponse};
use glowworm_primitives::peer::Peer;
use glowworm_primitives::InfoHash;

/// Builds the bencoded `/announce` success body.
///
/// `compact` selects the BEP 23 packed peer encoding (`peers`/`peers6` as
/// concatenated fixed-width byte strings); otherwise each peer is a
/// dictionary, with `peer id` included unless `no_peer_id` is set.
#[must_use]
pub fn announce(resp: &AnnounceResponse, compact: bool, no_peer_id: bool) -> Vec<u8> {
    let mut entries = vec![
        (b"interval".to_vec(), Value::Int(i64::from(resp.interval))),
        (b"complete".to_vec(), Value::Int(i64::from(resp.complete))),
        (b"incomplete".to_vec(), Value::Int(i64::from(resp.incomplete))),
    ];

    if let Some(min_interval) = resp.min_interval {
        entries.push((b"min interval".to_vec(), Value::Int(i64::from(min_interval))));
    }

    if compact {
        entries.extend(compact_peers(&resp.peers));
    } else {
        entries.push((b"peers".to_vec(), Value::List(resp.peers.iter().map(|p| peer_dict(p, no_peer_id)).collect())));
    }

    encode(&Value::dict(entries))
}

fn compact_peers(peers: &[Arc<Peer>]) -> Vec<(Vec<u8>, Value)> {
    let mut v4 = Vec::new();
    let mut v6 = Vec::new();

    for peer in peers {
        match peer.peer_addr {
            SocketAddr::V4(addr) => {
                v4.extend_from_slice(&addr.ip().octets());
                v4.extend_from_slice(&addr.port().to_be_bytes());
            }
            SocketAddr::V6(addr) => {
                v6.extend_from_slice(&addr.ip().octets());
                v6.extend_from_slice(&addr.port().to_be_bytes());
            }
        }
    }

    let mut out = Vec::new();
    if !v4.is_empty() {
        out.push((b"peers".to_vec(), Value::Bytes(v4)));
    }
    if !v6.is_empty() {
        out.push((b"peers6".to_vec(), Value::Bytes(v6)));
    }
    out
}

fn peer_dict(peer: &Arc<Peer>, no_peer_id: bool) -> Value {
    let mut entries = vec![
        (b"ip".to_vec(), Value::string(peer.peer_addr.ip().to_string())),
        (b"port".to_vec(), Value::Int(i64::from(peer.peer_addr.port()))),
    ];
    if !no_peer_id {
        entries.push((b"peer id".to_vec(), Value::Bytes(peer.peer_id.0.to_vec())));
    }
    Value::dict(entries)
}

/// Builds the bencoded `/scrape` success body.
#[must_use]
pub fn scrape(resp: &ScrapeResponse) -> Vec<u8> {
    let files = resp
        .files
        .iter()
        .map(|(info_hash, metadata)| (info_hash_key(info_hash), file_entry(metadata)))
        .collect();

    encode(&Value::dict(vec![(b"files".to_vec(), Value::dict(files))]))
}

fn info_hash_key(info_hash: &InfoHash) -> Vec<u8> {
    info_hash.bytes().to_vec()
}

fn file_entry(metadata: &glowworm_swarm_store::SwarmMetadata) -> Value {
    Value::dict(vec![
        (b"complete".to_vec(), Value::Int(i64::from(metadata.complete))),
        (b"downloaded".to_vec(), Value::Int(i64::from(metadata.downloaded))),
        (b"incomplete".to_vec(), Value::Int(i64::from(metadata.incomplete))),
    ])
}

/// Builds the bencoded `d"failure reason" <string>e` body sent back (with an
/// HTTP 200 status) for client errors.
#[must_use]
pub fn failure(reason: &str) -> Vec<u8> {
    encode(&Value::dict(vec![(b"failure reason".to_vec(), Value::string(reason))]))
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use glowworm_primitives::peer::fixture::PeerBuilder;
    use glowworm_primitives::InfoHash;

    use super::{announce, failure, scrape};
    use glowworm_hooks::AnnounceResponse;
    use glowworm_swarm_store::SwarmMetadata;

    #[test]
    fn a_compact_response_packs_peers_into_one_byte_string() {
        let peer = Arc::new(
            PeerBuilder::seeder()
                .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 6881))
                .build(),
        );
        let resp = AnnounceResponse {
            interval: 120,
            min_interval: None,
            complete: 1,
            incomplete: 0,
            peers: vec![peer],
        };

        let body = announce(&resp, true, false);
        let decoded = glowworm_bencode::decode(&body).unwrap();
        let peers = decoded.get(b"peers").unwrap().as_bytes().unwrap();
        assert_eq!(peers.len(), 6);
    }

    #[test]
    fn a_non_compact_response_lists_peer_dictionaries() {
        let peer = Arc::new(PeerBuilder::seeder().build());
        let resp = AnnounceResponse {
            interval: 120,
            min_interval: None,
            complete: 1,
            incomplete: 0,
            peers: vec![peer],
        };

        let body = announce(&resp, false, false);
        let decoded = glowworm_bencode::decode(&body).unwrap();
        let peers = decoded.get(b"peers").unwrap().as_list().unwrap();
        assert_eq!(peers.len(), 1);
        assert!(peers[0].get(b"peer id").is_some());
    }

    #[test]
    fn no_peer_id_omits_the_peer_id_field() {
        let peer = Arc::new(PeerBuilder::seeder().build());
        let resp = AnnounceResponse {
            interval: 120,
            min_interval: None,
            complete: 1,
            incomplete: 0,
            peers: vec![peer],
        };

        let body = announce(&resp, false, true);
        let decoded = glowworm_bencode::decode(&body).unwrap();
        let peers = decoded.get(b"peers").unwrap().as_list().unwrap();
        assert!(peers[0].get(b"peer id").is_none());
    }

    #[test]
    fn scrape_nests_swarm_metadata_under_the_info_hash() {
        let info_hash = InfoHash::from([1u8; 20]);
        let resp = glowworm_hooks::ScrapeResponse {
            files: vec![(info_hash, SwarmMetadata { complete: 2, incomplete: 3, downloaded: 9 })],
        };

        let body = scrape(&resp);
        let decoded = glowworm_bencode::decode(&body).unwrap();
        let files = decoded.get(b"files").unwrap();
        let entry = files.get(&info_hash.bytes()).unwrap();
        assert_eq!(entry.get(b"downloaded").unwrap().as_int(), Some(9));
    }

    #[test]
    fn a_failure_reason_round_trips() {
        let body = failure("malformed info_hash");
        let decoded = glowworm_bencode::decode(&body).unwrap();
        assert_eq!(decoded.get(b"failure reason").unwrap().as_bytes(), Some(&b"malformed info_hash"[..]));
    }
}
