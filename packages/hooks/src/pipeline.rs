use std::net::SocketAddr;
use std::sync::Arc;

use glowworm_primitives::peer::PeerId;
use glowworm_primitives::{AnnounceEvent, ClientId, InfoHash, IpVersion};
use glowworm_swarm_store::{SwarmMetadata, SwarmStore};
use tracing::info_span;

use crate::context::{Context, NumWantKey, SkipResponseHookKey, SkipSwarmInteractionKey};
use crate::error::ClientError;
use crate::hooks::{response, sanitize, swarm_interaction};

/// The fields of an announce request that survive decoding from either
/// frontend, before any hook has touched them.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub peer_addr: SocketAddr,
    pub uploaded: i64,
    pub downloaded: i64,
    pub left: i64,
    pub event: AnnounceEvent,
    /// Signed per the wire format: negative means "no preference", handled
    /// by the sanitize hook as the default `num_want`.
    pub num_want: i32,
    pub jwt: Option<String>,
}

impl AnnounceRequest {
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        ClientId::from_peer_id(&self.peer_id)
    }

    #[must_use]
    pub fn ip_version(&self) -> IpVersion {
        IpVersion::of(&self.peer_addr)
    }

    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left <= 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnounceResponse {
    pub interval: u32,
    pub min_interval: Option<u32>,
    pub complete: u32,
    pub incomplete: u32,
    pub peers: Vec<Arc<glowworm_primitives::peer::Peer>>,
}

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub info_hashes: Vec<InfoHash>,
    pub is_ipv6: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeResponse {
    pub files: Vec<(InfoHash, SwarmMetadata)>,
}

/// A user-configured pre-hook applied only to announce requests — the
/// built-in sanitize and response stages are not expressed through this
/// trait since they always run, in a fixed position, for every pipeline.
pub trait AnnounceHook: Send + Sync {
    fn name(&self) -> &'static str;
    fn call(&self, ctx: &mut Context, req: &AnnounceRequest, resp: &mut AnnounceResponse) -> Result<(), ClientError>;
}

/// Composes the built-in sanitize/response stages with a caller-configured
/// list of [`AnnounceHook`]s, and runs the swarm-interaction post-hook after
/// the response has been assembled.
pub struct Pipeline {
    store: Arc<SwarmStore>,
    hooks: Vec<Arc<dyn AnnounceHook>>,
    default_interval: u32,
    default_num_want: usize,
    max_num_want: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(store: Arc<SwarmStore>, hooks: Vec<Arc<dyn AnnounceHook>>, default_interval: u32, default_num_want: usize, max_num_want: usize) -> Self {
        Self {
            store,
            hooks,
            default_interval,
            default_num_want,
            max_num_want,
        }
    }

    /// Runs the full announce pipeline: sanitize, configured hooks, response
    /// assembly, then (best-effort, errors logged not propagated) the
    /// swarm-interaction write-back.
    pub fn handle_announce(&self, req: &AnnounceRequest) -> Result<AnnounceResponse, ClientError> {
        let span = info_span!("announce", info_hash = %req.info_hash, peer_id = %glowworm_primitives::peer::Id::from(req.peer_id));
        let _entered = span.enter();

        let mut ctx = Context::new();
        let mut resp = AnnounceResponse {
            interval: self.default_interval,
            ..AnnounceResponse::default()
        };

        sanitize::call(&mut ctx, req, self.default_num_want, self.max_num_want)?;

        for hook in &self.hooks {
            if let Err(err) = hook.call(&mut ctx, req, &mut resp) {
                tracing::debug!(hook = hook.name(), error = %err, "pre-hook rejected the announce");
                return Err(err);
            }
        }

        if !ctx.flag::<SkipResponseHookKey>() {
            let num_want = ctx.get::<NumWantKey>().copied().unwrap_or(self.default_num_want);
            response::call(&self.store, req, num_want, &mut resp)?;
        }

        if !ctx.flag::<SkipSwarmInteractionKey>() {
            if let Err(err) = swarm_interaction::call(&self.store, req) {
                tracing::warn!(error = %err, "swarm-interaction post-hook failed");
            }
        }

        Ok(resp)
    }

    /// Scrape has no user-configured hooks (per [`AnnounceHook`]'s contract,
    /// client-approval and JWT only gate announces): the response is read
    /// straight from the store, one file per requested info-hash.
    ///
    /// # Errors
    ///
    /// Returns `Err(ClientError::ResourceDoesNotExist)` once the store has
    /// been stopped, rather than silently scraping to all zeros.
    pub fn handle_scrape(&self, req: &ScrapeRequest) -> Result<ScrapeResponse, ClientError> {
        let span = info_span!("scrape", count = req.info_hashes.len());
        let _entered = span.enter();

        let ip_version = if req.is_ipv6 { IpVersion::V6 } else { IpVersion::V4 };
        let files = req
            .info_hashes
            .iter()
            .map(|info_hash| {
                self.store
                    .scrape_swarm(*info_hash, ip_version)
                    .map(|metadata| (*info_hash, metadata))
                    .map_err(|_| ClientError::ResourceDoesNotExist)
            })
            .collect::<Result<_, _>>()?;
        Ok(ScrapeResponse { files })
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use glowworm_primitives::peer::PeerId;
    use glowworm_primitives::{AnnounceEvent, InfoHash};
    use glowworm_swarm_store::SwarmStore;

    use super::{AnnounceRequest, Pipeline};
    use crate::error::ClientError;
    use crate::hooks::ClientApproval;

    fn request(peer_id: [u8; 20], addr: SocketAddr) -> AnnounceRequest {
        AnnounceRequest {
            info_hash: InfoHash::from([9u8; 20]),
            peer_id: PeerId(peer_id),
            peer_addr: addr,
            uploaded: 0,
            downloaded: 0,
            left: 10,
            event: AnnounceEvent::Started,
            num_want: 50,
            jwt: None,
        }
    }

    #[test]
    fn a_full_announce_registers_the_peer_and_reflects_in_a_second_announce() {
        let store = Arc::new(SwarmStore::with_shard_count(4));
        let pipeline = Pipeline::new(store, Vec::new(), 1800, 50, 200);

        let a = request(*b"-gw0000000000000001a", SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6881));
        let resp_a = pipeline.handle_announce(&a).unwrap();
        assert_eq!(resp_a.incomplete, 1);
        assert_eq!(resp_a.peers.len(), 1);
        assert_eq!(resp_a.peers[0].peer_addr, a.peer_addr);

        let b = request(*b"-gw0000000000000002b", SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)), 6882));
        let resp_b = pipeline.handle_announce(&b).unwrap();
        assert_eq!(resp_b.incomplete, 2);
        assert_eq!(resp_b.peers.len(), 1);
        assert_eq!(resp_b.peers[0].peer_addr, a.peer_addr);
    }

    #[test]
    fn a_configured_hook_can_reject_before_the_response_hook_runs() {
        let store = Arc::new(SwarmStore::with_shard_count(4));
        let hook = Arc::new(ClientApproval::blacklist(vec![glowworm_primitives::ClientId(*b"-gw000")]).unwrap());
        let pipeline = Pipeline::new(store, vec![hook], 1800, 50, 200);

        let req = request(*b"-gw0000000000000001a", SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6881));
        let err = pipeline.handle_announce(&req).unwrap_err();
        assert_eq!(err, ClientError::UnapprovedClient);
    }

    #[test]
    fn scrape_reports_each_requested_info_hash_independently() {
        use glowworm_primitives::peer::fixture::PeerBuilder;

        use super::ScrapeRequest;

        let store = Arc::new(SwarmStore::with_shard_count(4));
        let hash_a = InfoHash::from([1u8; 20]);
        let hash_b = InfoHash::from([2u8; 20]);
        let hash_c = InfoHash::from([3u8; 20]);

        let seeder = PeerBuilder::seeder().build();
        let leecher = PeerBuilder::leecher().build();
        store.put_seeder(hash_a, seeder).unwrap();
        store.put_leecher(hash_b, leecher).unwrap();

        let pipeline = Pipeline::new(store, Vec::new(), 1800, 50, 200);
        let resp = pipeline
            .handle_scrape(&ScrapeRequest { info_hashes: vec![hash_a, hash_b, hash_c], is_ipv6: false })
            .unwrap();

        let find = |h: InfoHash| resp.files.iter().find(|(info_hash, _)| *info_hash == h).unwrap().1;
        assert_eq!((find(hash_a).complete, find(hash_a).incomplete), (1, 0));
        assert_eq!((find(hash_b).complete, find(hash_b).incomplete), (0, 1));
        assert_eq!((find(hash_c).complete, find(hash_c).incomplete), (0, 0));
    }

    #[test]
    fn scrape_fails_once_the_store_is_stopped() {
        use super::ScrapeRequest;

        let store = Arc::new(SwarmStore::with_shard_count(4));
        store.stop();
        let pipeline = Pipeline::new(store, Vec::new(), 1800, 50, 200);

        let err = pipeline
            .handle_scrape(&ScrapeRequest { info_hashes: vec![InfoHash::from([1u8; 20])], is_ipv6: false })
            .unwrap_err();

        assert_eq!(err, ClientError::ResourceDoesNotExist);
    }
}
