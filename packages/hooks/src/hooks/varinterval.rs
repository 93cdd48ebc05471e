use glowworm_prng::LockedPrng;
use thiserror::Error;

use crate::context::Context;
use crate::error::ClientError;
use crate::pipeline::{AnnounceHook, AnnounceRequest, AnnounceResponse};

const SHARD_COUNT: usize = 65536;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VarintervalConfigError {
    #[error("modify_response_probability must be in (0, 1], got {0}")]
    InvalidProbability(String),
    #[error("max_increase_delta must be greater than zero")]
    NonPositiveMaxIncreaseDelta,
}

/// Jitters the announce interval to spread re-announces out over time,
/// avoiding a thundering herd of clients that all announced at once.
///
/// PRNG state is sharded by the info-hash's first two bytes so that
/// concurrent announces for different torrents don't serialize on one
/// shared generator's lock.
pub struct Varinterval {
    shards: Vec<LockedPrng>,
    modify_response_probability: f64,
    max_increase_delta: u64,
    modify_min_interval: bool,
}

impl Varinterval {
    pub fn new(modify_response_probability: f64, max_increase_delta: u64, modify_min_interval: bool) -> Result<Self, VarintervalConfigError> {
        if !(modify_response_probability > 0.0 && modify_response_probability <= 1.0) {
            return Err(VarintervalConfigError::InvalidProbability(modify_response_probability.to_string()));
        }
        if max_increase_delta == 0 {
            return Err(VarintervalConfigError::NonPositiveMaxIncreaseDelta);
        }
        Ok(Self {
            shards: (0..SHARD_COUNT).map(|_| LockedPrng::new()).collect(),
            modify_response_probability,
            max_increase_delta,
            modify_min_interval,
        })
    }

    fn shard_for(&self, info_hash: &glowworm_primitives::InfoHash) -> &LockedPrng {
        let bytes = info_hash.bytes();
        let index = (usize::from(bytes[0]) << 8) | usize::from(bytes[1]);
        &self.shards[index % self.shards.len()]
    }
}

impl AnnounceHook for Varinterval {
    fn name(&self) -> &'static str {
        "interval variation"
    }

    fn call(&self, _ctx: &mut Context, req: &AnnounceRequest, resp: &mut AnnounceResponse) -> Result<(), ClientError> {
        let prng = self.shard_for(&req.info_hash);

        let roll = prng.intn(1_000_000);
        let threshold = (self.modify_response_probability * 1_000_000.0) as u64;
        if roll >= threshold {
            return Ok(());
        }

        let delta = 1 + prng.intn(self.max_increase_delta);
        let delta = u32::try_from(delta).unwrap_or(u32::MAX);

        resp.interval = resp.interval.saturating_add(delta);
        if self.modify_min_interval {
            resp.min_interval = Some(resp.min_interval.unwrap_or(resp.interval).saturating_add(delta));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use glowworm_primitives::peer::PeerId;
    use glowworm_primitives::{AnnounceEvent, InfoHash};

    use super::Varinterval;
    use crate::context::Context;
    use crate::pipeline::{AnnounceHook, AnnounceRequest, AnnounceResponse};

    fn request() -> AnnounceRequest {
        AnnounceRequest {
            info_hash: InfoHash::from([3u8; 20]),
            peer_id: PeerId(*b"-gw0000000000000001a"),
            peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6881),
            uploaded: 0,
            downloaded: 0,
            left: 0,
            event: AnnounceEvent::Started,
            num_want: 50,
            jwt: None,
        }
    }

    #[test]
    fn rejects_a_zero_probability() {
        assert!(Varinterval::new(0.0, 10, false).is_err());
    }

    #[test]
    fn rejects_a_probability_above_one() {
        assert!(Varinterval::new(1.5, 10, false).is_err());
    }

    #[test]
    fn rejects_a_zero_max_increase_delta() {
        assert!(Varinterval::new(1.0, 0, false).is_err());
    }

    #[test]
    fn a_probability_of_one_always_increases_the_interval() {
        let hook = Varinterval::new(1.0, 10, true).unwrap();
        let req = request();
        let mut ctx = Context::new();
        let mut resp = AnnounceResponse {
            interval: 1800,
            ..AnnounceResponse::default()
        };
        hook.call(&mut ctx, &req, &mut resp).unwrap();
        assert!(resp.interval > 1800);
        assert!(resp.min_interval.is_some());
    }
}
