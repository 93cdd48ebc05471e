use glowworm_primitives::ClientId;
use thiserror::Error;

use crate::context::Context;
use crate::error::ClientError;
use crate::pipeline::{AnnounceHook, AnnounceRequest, AnnounceResponse};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClientApprovalConfigError {
    #[error("client approval needs exactly one of a whitelist or a blacklist, not both")]
    BothListsConfigured,
    #[error("client approval needs at least one of a whitelist or a blacklist")]
    NoListConfigured,
}

enum Policy {
    Whitelist(Vec<ClientId>),
    Blacklist(Vec<ClientId>),
}

/// Rejects announces from client ids not on a configured whitelist, or on a
/// configured blacklist. Exactly one of the two lists may be non-empty;
/// construction fails otherwise so a misconfiguration can never silently
/// admit or reject everyone.
pub struct ClientApproval {
    policy: Policy,
}

impl ClientApproval {
    pub fn whitelist(client_ids: Vec<ClientId>) -> Result<Self, ClientApprovalConfigError> {
        if client_ids.is_empty() {
            return Err(ClientApprovalConfigError::NoListConfigured);
        }
        Ok(Self {
            policy: Policy::Whitelist(client_ids),
        })
    }

    pub fn blacklist(client_ids: Vec<ClientId>) -> Result<Self, ClientApprovalConfigError> {
        if client_ids.is_empty() {
            return Err(ClientApprovalConfigError::NoListConfigured);
        }
        Ok(Self {
            policy: Policy::Blacklist(client_ids),
        })
    }
}

impl AnnounceHook for ClientApproval {
    fn name(&self) -> &'static str {
        "client approval"
    }

    fn call(&self, _ctx: &mut Context, req: &AnnounceRequest, _resp: &mut AnnounceResponse) -> Result<(), ClientError> {
        let client_id = req.client_id();
        let approved = match &self.policy {
            Policy::Whitelist(allowed) => allowed.contains(&client_id),
            Policy::Blacklist(denied) => !denied.contains(&client_id),
        };
        if approved {
            Ok(())
        } else {
            Err(ClientError::UnapprovedClient)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use glowworm_primitives::peer::PeerId;
    use glowworm_primitives::{AnnounceEvent, ClientId, InfoHash};

    use super::ClientApproval;
    use crate::context::Context;
    use crate::pipeline::{AnnounceHook, AnnounceRequest, AnnounceResponse};

    fn request(peer_id: [u8; 20]) -> AnnounceRequest {
        AnnounceRequest {
            info_hash: InfoHash::from([0u8; 20]),
            peer_id: PeerId(peer_id),
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
    fn an_empty_whitelist_is_rejected_at_construction() {
        assert!(ClientApproval::whitelist(Vec::new()).is_err());
    }

    #[test]
    fn a_whitelisted_client_id_is_approved() {
        let id = ClientId(*b"-gw001");
        let hook = ClientApproval::whitelist(vec![id]).unwrap();
        let req = request(*b"-gw0010000000000000a");
        let mut ctx = Context::new();
        let mut resp = AnnounceResponse::default();
        hook.call(&mut ctx, &req, &mut resp).unwrap();
    }

    #[test]
    fn a_blacklisted_client_id_is_rejected() {
        let id = ClientId(*b"-gw001");
        let hook = ClientApproval::blacklist(vec![id]).unwrap();
        let req = request(*b"-gw0010000000000000a");
        let mut ctx = Context::new();
        let mut resp = AnnounceResponse::default();
        let err = hook.call(&mut ctx, &req, &mut resp).unwrap_err();
        assert_eq!(err, crate::error::ClientError::UnapprovedClient);
    }
}
