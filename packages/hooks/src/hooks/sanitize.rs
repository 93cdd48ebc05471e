use crate::context::{Context, NumWantKey};
use crate::error::ClientError;
use crate::pipeline::AnnounceRequest;

/// Always the first pre-hook: clamps `num_want` into `[0, max]`, defaulting
/// only the wire's "no preference" sentinel (`-1`) and flooring any other
/// negative value to zero, and rejects addresses a response could never be
/// routed to.
pub fn call(ctx: &mut Context, req: &AnnounceRequest, default_num_want: usize, max_num_want: usize) -> Result<(), ClientError> {
    if req.peer_addr.ip().is_unspecified() {
        return Err(ClientError::InvalidIp);
    }

    let num_want = if req.num_want == -1 {
        default_num_want
    } else {
        usize::try_from(req.num_want).unwrap_or(0).min(max_num_want)
    };
    ctx.set::<NumWantKey>(num_want);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use glowworm_primitives::peer::PeerId;
    use glowworm_primitives::{AnnounceEvent, InfoHash};

    use super::call;
    use crate::context::{Context, NumWantKey};

    fn request(num_want: i32, ip: IpAddr) -> super::AnnounceRequest {
        super::AnnounceRequest {
            info_hash: InfoHash::from([0u8; 20]),
            peer_id: PeerId(*b"-gw0000000000000001a"),
            peer_addr: SocketAddr::new(ip, 6881),
            uploaded: 0,
            downloaded: 0,
            left: 0,
            event: AnnounceEvent::Started,
            num_want,
            jwt: None,
        }
    }

    #[test]
    fn the_no_preference_sentinel_defaults() {
        let mut ctx = Context::new();
        call(&mut ctx, &request(-1, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))), 50, 200).unwrap();
        assert_eq!(ctx.get::<NumWantKey>(), Some(&50));
    }

    #[test]
    fn other_negative_values_clamp_to_zero() {
        let mut ctx = Context::new();
        call(&mut ctx, &request(-2, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))), 50, 200).unwrap();
        assert_eq!(ctx.get::<NumWantKey>(), Some(&0));
    }

    #[test]
    fn an_oversized_num_want_is_clamped() {
        let mut ctx = Context::new();
        call(&mut ctx, &request(10_000, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))), 50, 200).unwrap();
        assert_eq!(ctx.get::<NumWantKey>(), Some(&200));
    }

    #[test]
    fn an_unspecified_address_is_rejected() {
        let mut ctx = Context::new();
        let err = call(&mut ctx, &request(50, IpAddr::V4(Ipv4Addr::UNSPECIFIED)), 50, 200).unwrap_err();
        assert_eq!(err, super::ClientError::InvalidIp);
    }
}
