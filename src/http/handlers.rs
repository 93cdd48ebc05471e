//! Axum handlers for `/announce` and `/scrape`.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use glowworm_hooks::{AnnounceRequest, ScrapeRequest};

use super::extractors::{AnnounceQuery, QueryError, ScrapeQuery};
use super::responses;
use super::server::AppState;

/// Resolves the address the request should be attributed to: the socket's
/// peer address, unless `allow_ip_spoofing` trusts a header instead.
fn resolve_peer_ip(state: &AppState, headers: &HeaderMap, socket_addr: SocketAddr, query_ip: Option<IpAddr>) -> IpAddr {
    if state.allow_ip_spoofing {
        if let Some(header_name) = &state.real_ip_header {
            if let Some(value) = headers.get(header_name).and_then(|v| v.to_str().ok()) {
                if let Ok(ip) = value.split(',').next().unwrap_or(value).trim().parse() {
                    return ip;
                }
            }
        }
        if let Some(ip) = query_ip {
            return ip;
        }
    }
    socket_addr.ip()
}

fn bencoded(body: Vec<u8>) -> Response {
    ([(axum::http::header::CONTENT_TYPE, "text/plain")], body).into_response()
}

pub async fn announce(
    State(state): State<Arc<AppState>>,
    ConnectInfo(socket_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = match AnnounceQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(err) => return bencoded(responses::failure(&query_error_message(&err))),
    };

    let peer_ip = resolve_peer_ip(&state, &headers, socket_addr, query.ip);

    let req = AnnounceRequest {
        info_hash: query.info_hash,
        peer_id: query.peer_id,
        peer_addr: SocketAddr::new(peer_ip, query.port),
        uploaded: query.uploaded,
        downloaded: query.downloaded,
        left: query.left,
        event: query.event,
        num_want: query.numwant.unwrap_or(-1),
        jwt: query.jwt,
    };

    match state.pipeline.handle_announce(&req) {
        Ok(resp) => bencoded(responses::announce(&resp, query.compact, false)),
        Err(err) => bencoded(responses::failure(&client_error_message(&err))),
    }
}

pub async fn scrape(State(state): State<Arc<AppState>>, RawQuery(raw): RawQuery) -> Response {
    let query = match ScrapeQuery::parse(raw.as_deref()) {
        Ok(query) => query,
        Err(err) => return bencoded(responses::failure(&query_error_message(&err))),
    };

    let req = ScrapeRequest { info_hashes: query.info_hashes, is_ipv6: false };
    match state.pipeline.handle_scrape(&req) {
        Ok(resp) => bencoded(responses::scrape(&resp)),
        Err(err) => bencoded(responses::failure(&client_error_message(&err))),
    }
}

fn query_error_message(err: &QueryError) -> String {
    err.to_string()
}

fn client_error_message(err: &glowworm_hooks::ClientError) -> String {
    use glowworm_hooks::ClientError;
    match err {
        ClientError::InvalidQuery => "invalid query".to_owned(),
        ClientError::MalformedInfoHash => "malformed info_hash".to_owned(),
        ClientError::UnapprovedClient => "unapproved client".to_owned(),
        ClientError::InvalidJwt => "invalid jwt".to_owned(),
        ClientError::InvalidIp => "invalid ip".to_owned(),
        ClientError::ResourceDoesNotExist => "resource does not exist".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use axum::http::HeaderMap;

    use super::resolve_peer_ip;
    use crate::http::server::AppState;

    fn state(allow_ip_spoofing: bool, real_ip_header: Option<&str>) -> AppState {
        AppState {
            pipeline: Arc::new(glowworm_hooks::Pipeline::new(
                Arc::new(glowworm_swarm_store::SwarmStore::with_shard_count(4)),
                Vec::new(),
                1800,
                50,
                200,
            )),
            allow_ip_spoofing,
            real_ip_header: real_ip_header.map(ToOwned::to_owned),
            read_timeout_ms: 5000,
        }
    }

    fn socket_addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6881)
    }

    #[test]
    fn without_ip_spoofing_the_socket_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.9".parse().unwrap());
        let ip = resolve_peer_ip(&state(false, Some("x-forwarded-for")), &headers, socket_addr(), None);
        assert_eq!(ip, socket_addr().ip());
    }

    #[test]
    fn with_ip_spoofing_the_configured_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.9".parse().unwrap());
        let ip = resolve_peer_ip(&state(true, Some("x-forwarded-for")), &headers, socket_addr(), None);
        assert_eq!(ip, "10.0.0.9".parse::<IpAddr>().unwrap());
    }
}
