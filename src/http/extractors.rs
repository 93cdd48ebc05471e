//! Percent-decoding query-string parsing for the announce and scrape routes.
//!
//! `info_hash` and `peer_id` carry raw 20-byte strings rather than valid
//! UTF-8 text, so they're decoded straight to bytes rather than routed
//! through a `serde`-based query extractor that expects `String` values.
use std::net::IpAddr;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use glowworm_primitives::peer::PeerId;
use glowworm_primitives::{AnnounceEvent, InfoHash};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("missing query parameters")]
    MissingParams,
    #[error("missing required parameter `{0}`")]
    MissingParam(&'static str),
    #[error("malformed parameter `{0}`")]
    MalformedParam(&'static str),
}

/// A parsed, un-validated view over a raw query string: every `name=value`
/// pair with its value percent-decoded to bytes.
struct RawQuery {
    pairs: Vec<(String, Vec<u8>)>,
}

impl RawQuery {
    fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| {
                let (name, value) = segment.split_once('=')?;
                Some((name.to_owned(), percent_decode_str(value).collect::<Vec<u8>>()))
            })
            .collect();
        Self { pairs }
    }

    fn first(&self, name: &str) -> Option<&[u8]> {
        self.pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_slice())
    }

    fn all(&self, name: &str) -> Vec<&[u8]> {
        self.pairs.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_slice()).collect()
    }

    fn first_str(&self, name: &str) -> Option<&str> {
        self.first(name).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

/// The fields of an `/announce` request as they appear on the HTTP wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceQuery {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: i64,
    pub downloaded: i64,
    pub left: i64,
    pub compact: bool,
    pub event: AnnounceEvent,
    pub numwant: Option<i32>,
    pub ip: Option<IpAddr>,
    pub jwt: Option<String>,
}

impl AnnounceQuery {
    /// # Errors
    ///
    /// Returns `Err` if the query is missing, or a required parameter is
    /// missing or not the right length/format.
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        let raw = raw.ok_or(QueryError::MissingParams)?;
        let query = RawQuery::parse(raw);

        let info_hash = InfoHash::try_from(query.first("info_hash").ok_or(QueryError::MissingParam("info_hash"))?)
            .map_err(|_| QueryError::MalformedParam("info_hash"))?;
        let peer_id_bytes = query.first("peer_id").ok_or(QueryError::MissingParam("peer_id"))?;
        let peer_id = glowworm_primitives::peer::Id::try_from(peer_id_bytes)
            .map_err(|_| QueryError::MalformedParam("peer_id"))?;

        let port = query
            .first_str("port")
            .ok_or(QueryError::MissingParam("port"))?
            .parse::<u16>()
            .map_err(|_| QueryError::MalformedParam("port"))?;

        Ok(Self {
            info_hash,
            peer_id: *peer_id,
            port,
            uploaded: parse_or_zero(query.first_str("uploaded")),
            downloaded: parse_or_zero(query.first_str("downloaded")),
            left: parse_or_zero(query.first_str("left")),
            compact: query.first_str("compact") != Some("0"),
            event: query.first_str("event").map_or(AnnounceEvent::None, AnnounceEvent::from_query_value),
            numwant: query.first_str("numwant").and_then(|v| v.parse().ok()),
            ip: query.first_str("ip").and_then(|v| v.parse().ok()),
            jwt: query.first_str("jwt").map(str::to_owned),
        })
    }
}

/// The fields of a `/scrape` request: one or more `info_hash` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeQuery {
    pub info_hashes: Vec<InfoHash>,
}

impl ScrapeQuery {
    /// # Errors
    ///
    /// Returns `Err` if the query is missing or carries no valid info-hash.
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        let raw = raw.ok_or(QueryError::MissingParams)?;
        let query = RawQuery::parse(raw);

        let info_hashes: Vec<InfoHash> = query
            .all("info_hash")
            .into_iter()
            .filter_map(|bytes| InfoHash::try_from(bytes).ok())
            .collect();

        if info_hashes.is_empty() {
            return Err(QueryError::MissingParam("info_hash"));
        }

        Ok(Self { info_hashes })
    }
}

fn parse_or_zero(value: Option<&str>) -> i64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{AnnounceQuery, ScrapeQuery};

    const SAMPLE_INFO_HASH: &str = "%81%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00";
    const SAMPLE_PEER_ID: &str = "-gw0000000000000001a";

    #[test]
    fn parses_a_minimal_announce_query() {
        let raw = format!("info_hash={SAMPLE_INFO_HASH}&peer_id={SAMPLE_PEER_ID}&port=6881");
        let query = AnnounceQuery::parse(Some(&raw)).unwrap();
        assert_eq!(query.port, 6881);
        assert_eq!(query.uploaded, 0);
        assert!(query.compact);
    }

    #[test]
    fn compact_equal_to_zero_disables_compact_mode() {
        let raw = format!("info_hash={SAMPLE_INFO_HASH}&peer_id={SAMPLE_PEER_ID}&port=6881&compact=0");
        let query = AnnounceQuery::parse(Some(&raw)).unwrap();
        assert!(!query.compact);
    }

    #[test]
    fn parses_a_jwt_parameter_when_present() {
        let raw = format!("info_hash={SAMPLE_INFO_HASH}&peer_id={SAMPLE_PEER_ID}&port=6881&jwt=abc.def.ghi");
        let query = AnnounceQuery::parse(Some(&raw)).unwrap();
        assert_eq!(query.jwt.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn jwt_is_absent_when_not_given() {
        let raw = format!("info_hash={SAMPLE_INFO_HASH}&peer_id={SAMPLE_PEER_ID}&port=6881");
        let query = AnnounceQuery::parse(Some(&raw)).unwrap();
        assert!(query.jwt.is_none());
    }

    #[test]
    fn a_missing_query_is_rejected() {
        assert!(AnnounceQuery::parse(None).is_err());
    }

    #[test]
    fn a_missing_info_hash_is_rejected() {
        let raw = format!("peer_id={SAMPLE_PEER_ID}&port=6881");
        assert!(AnnounceQuery::parse(Some(&raw)).is_err());
    }

    #[test]
    fn scrape_accepts_repeated_info_hash_params() {
        let raw = format!("info_hash={SAMPLE_INFO_HASH}&info_hash={SAMPLE_INFO_HASH}");
        let query = ScrapeQuery::parse(Some(&raw)).unwrap();
        assert_eq!(query.info_hashes.len(), 2);
    }
}
