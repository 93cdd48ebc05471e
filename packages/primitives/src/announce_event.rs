use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Announce events, as described by
/// [BEP 3](https://www.bittorrent.org/beps/bep_0003.html).
///
/// This is the canonical in-process representation; both frontends convert
/// their own wire encoding (a signed integer on the UDP wire, a query string
/// on the HTTP wire) into this type before the request reaches the pipeline.
#[derive(Hash, Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AnnounceEvent {
    /// One of the announcements done at regular intervals. Default when no
    /// event is given.
    #[display("")]
    #[default]
    None,
    /// The peer has started downloading the torrent.
    #[display("started")]
    Started,
    /// The peer has completed downloading the torrent.
    #[display("completed")]
    Completed,
    /// The peer has ceased downloading the torrent.
    #[display("stopped")]
    Stopped,
}

impl AnnounceEvent {
    #[must_use]
    pub fn from_i32(i: i32) -> Self {
        match i {
            1 => Self::Completed,
            2 => Self::Started,
            3 => Self::Stopped,
            _ => Self::None,
        }
    }

    #[must_use]
    pub fn to_i32(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Completed => 1,
            Self::Started => 2,
            Self::Stopped => 3,
        }
    }

    #[must_use]
    pub fn from_query_value(value: &str) -> Self {
        match value {
            "started" => Self::Started,
            "completed" => Self::Completed,
            "stopped" => Self::Stopped,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnnounceEvent;

    #[test]
    fn round_trips_through_the_udp_wire_integer_encoding() {
        for event in [
            AnnounceEvent::None,
            AnnounceEvent::Completed,
            AnnounceEvent::Started,
            AnnounceEvent::Stopped,
        ] {
            assert_eq!(AnnounceEvent::from_i32(event.to_i32()), event);
        }
    }

    #[test]
    fn unknown_query_values_default_to_none() {
        assert_eq!(AnnounceEvent::from_query_value("paused"), AnnounceEvent::None);
    }
}
