//! Decodes one UDP datagram, drives it through the request pipeline, and
//! encodes the reply.
use std::net::SocketAddr;
use std::sync::Arc;

use aquatic_udp_protocol::{
    AnnounceInterval, AnnounceResponse as WireAnnounceResponse, ConnectResponse, ErrorResponse, NumberOfDownloads, NumberOfPeers,
    Request, Response, ResponsePeer, ScrapeResponse as WireScrapeResponse, TorrentScrapeStatistics,
};
use glowworm_clock::clock::Time;
use glowworm_hooks::{AnnounceRequest, ClientError, Pipeline, ScrapeRequest};
use glowworm_primitives::{IpVersion, InfoHash};

use super::connection::ConnectionIdIssuer;

/// The largest number of info-hashes accepted in one scrape packet. `aquatic`
/// requires a bound to size its read buffer; 74 keeps a maximal request
/// packet under the UDP tracker protocol's practical MTU.
const MAX_SCRAPE_TORRENTS: usize = 74;

#[cfg(not(test))]
type CurrentClock = glowworm_clock::clock::Working;
#[cfg(test)]
type CurrentClock = glowworm_clock::clock::Stopped;

/// Everything a single datagram's handling needs, shared across every
/// in-flight request.
pub struct Shared {
    pub pipeline: Arc<Pipeline>,
    pub connection_issuer: Arc<dyn ConnectionIdIssuer + Send + Sync>,
    pub max_clock_skew: u32,
}

/// Decodes `bytes` as a UDP tracker request from `peer_addr`, handles it, and
/// returns the wire bytes to send back. Returns `None` for input that
/// doesn't even parse as a request header, in which case no reply is sent
/// per the wire protocol (there is no transaction-id to echo).
#[must_use]
pub fn handle_packet(bytes: &[u8], peer_addr: SocketAddr, shared: &Shared) -> Option<Vec<u8>> {
    let request = Request::from_bytes(bytes, MAX_SCRAPE_TORRENTS).ok()?;
    let response = match request {
        Request::Connect(connect) => {
            let now = CurrentClock::now().as_secs();
            let connection_id = shared.connection_issuer.issue(peer_addr.ip(), now);
            Response::from(ConnectResponse {
                transaction_id: connect.transaction_id,
                connection_id: aquatic_udp_protocol::ConnectionId::new(connection_id),
            })
        }
        Request::Announce(announce) => handle_announce(&announce, peer_addr, shared),
        Request::Scrape(scrape) => handle_scrape(&scrape, shared),
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    response.write_bytes(&mut cursor).ok()?;
    Some(cursor.into_inner())
}

fn connection_is_valid(connection_id: i64, peer_addr: SocketAddr, shared: &Shared) -> bool {
    let now = CurrentClock::now().as_secs();
    let _ = shared.max_clock_skew;
    shared.connection_issuer.is_valid(connection_id, peer_addr.ip(), now)
}

fn handle_announce(announce: &aquatic_udp_protocol::AnnounceRequest, peer_addr: SocketAddr, shared: &Shared) -> Response {
    if !connection_is_valid(announce.connection_id.0.get(), peer_addr, shared) {
        return error_response(announce.transaction_id, "connection id expired");
    }

    let ip = announce
        .ip_address
        .map(std::net::IpAddr::V4)
        .unwrap_or(peer_addr.ip());
    let req = AnnounceRequest {
        info_hash: InfoHash::from(announce.info_hash),
        peer_id: announce.peer_id,
        peer_addr: SocketAddr::new(ip, announce.port.0.get()),
        uploaded: announce.bytes_uploaded.0.get(),
        downloaded: announce.bytes_downloaded.0.get(),
        left: announce.bytes_left.0.get(),
        event: from_wire_event(announce.event),
        num_want: announce.peers_wanted.0.get(),
        // The UDP announce packet carries no field for it; a JWT hook only
        // ever sees a token over the HTTP frontend.
        jwt: None,
    };

    match shared.pipeline.handle_announce(&req) {
        Ok(resp) => {
            let interval_secs = resp.min_interval.unwrap_or(resp.interval);
            let interval = AnnounceInterval::new(i32::try_from(interval_secs).unwrap_or(i32::MAX));
            match req.ip_version() {
                IpVersion::V4 => Response::from(WireAnnounceResponse {
                    transaction_id: announce.transaction_id,
                    announce_interval: interval,
                    leechers: NumberOfPeers::new(i32::try_from(resp.incomplete).unwrap_or(i32::MAX)),
                    seeders: NumberOfPeers::new(i32::try_from(resp.complete).unwrap_or(i32::MAX)),
                    peers: resp
                        .peers
                        .iter()
                        .filter_map(|peer| match peer.peer_addr {
                            SocketAddr::V4(addr) => Some(ResponsePeer {
                                ip_address: *addr.ip(),
                                port: aquatic_udp_protocol::Port::new(addr.port()),
                            }),
                            SocketAddr::V6(_) => None,
                        })
                        .collect(),
                }),
                IpVersion::V6 => Response::from(WireAnnounceResponse {
                    transaction_id: announce.transaction_id,
                    announce_interval: interval,
                    leechers: NumberOfPeers::new(i32::try_from(resp.incomplete).unwrap_or(i32::MAX)),
                    seeders: NumberOfPeers::new(i32::try_from(resp.complete).unwrap_or(i32::MAX)),
                    peers: resp
                        .peers
                        .iter()
                        .filter_map(|peer| match peer.peer_addr {
                            SocketAddr::V6(addr) => Some(ResponsePeer {
                                ip_address: *addr.ip(),
                                port: aquatic_udp_protocol::Port::new(addr.port()),
                            }),
                            SocketAddr::V4(_) => None,
                        })
                        .collect(),
                }),
            }
        }
        Err(err) => error_response(announce.transaction_id, &client_error_message(&err)),
    }
}

fn handle_scrape(scrape: &aquatic_udp_protocol::ScrapeRequest, shared: &Shared) -> Response {
    let req = ScrapeRequest {
        info_hashes: scrape.info_hashes.iter().copied().map(InfoHash::from).collect(),
        is_ipv6: false,
    };

    let resp = match shared.pipeline.handle_scrape(&req) {
        Ok(resp) => resp,
        Err(err) => return error_response(scrape.transaction_id, &client_error_message(&err)),
    };

    Response::from(WireScrapeResponse {
        transaction_id: scrape.transaction_id,
        torrent_stats: resp
            .files
            .into_iter()
            .map(|(_, metadata)| TorrentScrapeStatistics {
                seeders: NumberOfPeers::new(i32::try_from(metadata.complete).unwrap_or(i32::MAX)),
                completed: NumberOfDownloads::new(i32::try_from(metadata.downloaded).unwrap_or(i32::MAX)),
                leechers: NumberOfPeers::new(i32::try_from(metadata.incomplete).unwrap_or(i32::MAX)),
            })
            .collect(),
    })
}

fn from_wire_event(event: aquatic_udp_protocol::AnnounceEvent) -> glowworm_primitives::AnnounceEvent {
    match event {
        aquatic_udp_protocol::AnnounceEvent::Started => glowworm_primitives::AnnounceEvent::Started,
        aquatic_udp_protocol::AnnounceEvent::Completed => glowworm_primitives::AnnounceEvent::Completed,
        aquatic_udp_protocol::AnnounceEvent::Stopped => glowworm_primitives::AnnounceEvent::Stopped,
        aquatic_udp_protocol::AnnounceEvent::None => glowworm_primitives::AnnounceEvent::None,
    }
}

fn error_response(transaction_id: aquatic_udp_protocol::TransactionId, message: &str) -> Response {
    Response::from(ErrorResponse {
        transaction_id,
        message: message.into(),
    })
}

fn client_error_message(err: &ClientError) -> String {
    match err {
        ClientError::InvalidQuery => "invalid query".to_owned(),
        ClientError::MalformedInfoHash => "malformed info_hash".to_owned(),
        ClientError::UnapprovedClient => "unapproved client".to_owned(),
        ClientError::InvalidJwt => "invalid jwt".to_owned(),
        ClientError::InvalidIp => "invalid ip".to_owned(),
        ClientError::ResourceDoesNotExist => "resource does not exist".to_owned(),
    }
}
