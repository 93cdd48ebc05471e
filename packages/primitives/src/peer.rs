//! The [`Peer`] value type: one peer's identity, address, and transfer
//! counters, as tracked by a swarm entry.
use std::net::{IpAddr, SocketAddr};
use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::sync::Arc;

use aquatic_udp_protocol::NumberOfBytes;
pub use aquatic_udp_protocol::PeerId;
use serde::Serialize;
use thiserror::Error;

use crate::{AnnounceEvent, DurationSinceUnixEpoch, IpVersion};

pub const PEER_ID_BYTES_LEN: usize = 20;

/// A single peer's announced state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Peer {
    #[serde(serialize_with = "ser_peer_id")]
    pub peer_id: PeerId,
    pub peer_addr: SocketAddr,
    #[serde(serialize_with = "ser_unix_time_value")]
    pub updated: DurationSinceUnixEpoch,
    #[serde(serialize_with = "ser_number_of_bytes")]
    pub uploaded: NumberOfBytes,
    #[serde(serialize_with = "ser_number_of_bytes")]
    pub downloaded: NumberOfBytes,
    #[serde(serialize_with = "ser_number_of_bytes")]
    pub left: NumberOfBytes,
    pub event: AnnounceEvent,
}

pub fn ser_unix_time_value<S: serde::Serializer>(value: &DurationSinceUnixEpoch, ser: S) -> Result<S::Ok, S::Error> {
    #[allow(clippy::cast_possible_truncation)]
    ser.serialize_u64(value.as_millis() as u64)
}

pub fn ser_number_of_bytes<S: serde::Serializer>(value: &NumberOfBytes, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_i64(value.0.get())
}

pub fn ser_peer_id<S: serde::Serializer>(peer_id: &PeerId, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&Id::from(*peer_id).to_hex_string())
}

impl Peer {
    /// A peer is a seeder once it has nothing left to download and has not
    /// announced that it stopped.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left.0.get() <= 0 && self.event != AnnounceEvent::Stopped
    }

    #[must_use]
    pub fn ip_version(&self) -> IpVersion {
        IpVersion::of(&self.peer_addr)
    }
}

/// Read-only accessors shared by owned and `Arc`-wrapped peers, so the swarm
/// store can hand out `Arc<Peer>` without callers needing two code paths.
pub trait ReadInfo {
    fn is_seeder(&self) -> bool;
    fn event(&self) -> AnnounceEvent;
    fn id(&self) -> PeerId;
    fn updated(&self) -> DurationSinceUnixEpoch;
    fn address(&self) -> SocketAddr;
}

impl ReadInfo for Peer {
    fn is_seeder(&self) -> bool {
        Peer::is_seeder(self)
    }
    fn event(&self) -> AnnounceEvent {
        self.event
    }
    fn id(&self) -> PeerId {
        self.peer_id
    }
    fn updated(&self) -> DurationSinceUnixEpoch {
        self.updated
    }
    fn address(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl ReadInfo for Arc<Peer> {
    fn is_seeder(&self) -> bool {
        Peer::is_seeder(self)
    }
    fn event(&self) -> AnnounceEvent {
        self.event
    }
    fn id(&self) -> PeerId {
        self.peer_id
    }
    fn updated(&self) -> DurationSinceUnixEpoch {
        self.updated
    }
    fn address(&self) -> SocketAddr {
        self.peer_addr
    }
}

/// Error returned converting an invalid peer id from another type: the
/// source did not contain exactly 20 bytes.
#[derive(Error, Debug)]
pub enum IdConversionError {
    #[error("not enough bytes for a peer id: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    #[error("too many bytes for a peer id: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

/// A thin wrapper giving [`PeerId`] a hex `Display`/`Deref` without pulling
/// the wire type's own trait impls into scope everywhere it's printed.
pub struct Id(PeerId);

impl From<PeerId> for Id {
    fn from(id: PeerId) -> Self {
        Self(id)
    }
}

impl Deref for Id {
    type Target = PeerId;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Id {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = IdConversionError;

    #[track_caller]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len().cmp(&PEER_ID_BYTES_LEN) {
            std::cmp::Ordering::Less => Err(IdConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format!("got {} bytes, expected {PEER_ID_BYTES_LEN}", bytes.len()),
            }),
            std::cmp::Ordering::Greater => Err(IdConversionError::TooManyBytes {
                location: Location::caller(),
                message: format!("got {} bytes, expected {PEER_ID_BYTES_LEN}", bytes.len()),
            }),
            std::cmp::Ordering::Equal => {
                let mut array = [0u8; PEER_ID_BYTES_LEN];
                array.copy_from_slice(bytes);
                Ok(Self(PeerId(array)))
            }
        }
    }
}

impl Id {
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut out = [0u8; PEER_ID_BYTES_LEN * 2];
        binascii::bin2hex(&self.0 .0, &mut out).expect("20-byte buffer always hexlifies into 40 chars");
        std::str::from_utf8(&out).expect("bin2hex output is ASCII").to_owned()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

/// Fixtures used by tests across this workspace to build peers without
/// repeating the full struct literal.
pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use aquatic_udp_protocol::NumberOfBytes;

    use super::{Peer, PeerId};
    use crate::{AnnounceEvent, DurationSinceUnixEpoch};

    #[derive(Debug, Clone, PartialEq)]
    pub struct PeerBuilder {
        peer: Peer,
    }

    impl Default for PeerBuilder {
        fn default() -> Self {
            Self {
                peer: Peer {
                    peer_id: PeerId(*b"-gw0000000000000000a"),
                    peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                    updated: DurationSinceUnixEpoch::new(1_669_397_478, 0),
                    uploaded: NumberOfBytes::new(0),
                    downloaded: NumberOfBytes::new(0),
                    left: NumberOfBytes::new(0),
                    event: AnnounceEvent::Started,
                },
            }
        }
    }

    impl PeerBuilder {
        #[must_use]
        pub fn seeder() -> Self {
            Self::default()
                .with_peer_id(&PeerId(*b"-gw0000000000000000s"))
                .with_bytes_pending_to_download(0)
        }

        #[must_use]
        pub fn leecher() -> Self {
            Self::default()
                .with_peer_id(&PeerId(*b"-gw0000000000000000l"))
                .with_bytes_pending_to_download(10)
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: &PeerId) -> Self {
            self.peer.peer_id = *peer_id;
            self
        }

        #[must_use]
        pub fn with_peer_addr(mut self, peer_addr: &SocketAddr) -> Self {
            self.peer.peer_addr = *peer_addr;
            self
        }

        #[must_use]
        pub fn with_bytes_pending_to_download(mut self, left: i64) -> Self {
            self.peer.left = NumberOfBytes::new(left);
            if left == 0 {
                self.peer.event = AnnounceEvent::Completed;
            }
            self
        }

        #[must_use]
        pub fn last_updated_on(mut self, updated: DurationSinceUnixEpoch) -> Self {
            self.peer.updated = updated;
            self
        }

        #[must_use]
        pub fn with_event(mut self, event: AnnounceEvent) -> Self {
            self.peer.event = event;
            self
        }

        #[must_use]
        pub fn build(self) -> Peer {
            self.peer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::PeerBuilder;
    use super::Id;
    use crate::peer::PeerId;

    #[test]
    fn a_seeder_has_nothing_left_to_download_and_has_not_stopped() {
        assert!(PeerBuilder::seeder().build().is_seeder());
        assert!(!PeerBuilder::leecher().build().is_seeder());
    }

    #[test]
    fn rejects_a_peer_id_with_the_wrong_length() {
        assert!(Id::try_from(&[0u8; 19][..]).is_err());
        assert!(Id::try_from(&[0u8; 21][..]).is_err());
    }

    #[test]
    fn formats_a_peer_id_as_lowercase_hex() {
        let id = Id::from(PeerId([0xffu8; 20]));
        assert_eq!(id.to_hex_string(), "ff".repeat(20));
    }
}
