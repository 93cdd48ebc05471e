use std::ops::{Deref, DerefMut};
use std::panic::Location;

use thiserror::Error;

pub const INFO_HASH_BYTES_LEN: usize = 20;

/// A `BitTorrent` v1 info-hash: 20 opaque bytes identifying one torrent.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct InfoHash(aquatic_udp_protocol::InfoHash);

impl Default for InfoHash {
    fn default() -> Self {
        Self(aquatic_udp_protocol::InfoHash([0u8; INFO_HASH_BYTES_LEN]))
    }
}

impl InfoHash {
    /// Returns the info-hash's internal byte array.
    #[must_use]
    pub fn bytes(&self) -> [u8; INFO_HASH_BYTES_LEN] {
        self.0 .0
    }

    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

impl From<aquatic_udp_protocol::InfoHash> for InfoHash {
    fn from(data: aquatic_udp_protocol::InfoHash) -> Self {
        Self(data)
    }
}

impl From<InfoHash> for aquatic_udp_protocol::InfoHash {
    fn from(ih: InfoHash) -> Self {
        ih.0
    }
}

impl Deref for InfoHash {
    type Target = aquatic_udp_protocol::InfoHash;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for InfoHash {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Ord for InfoHash {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0 .0.cmp(&other.0 .0)
    }
}

impl PartialOrd for InfoHash {
    fn partial_cmp(&self, other: &InfoHash) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for InfoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chars = [0u8; INFO_HASH_BYTES_LEN * 2];
        binascii::bin2hex(&self.0 .0, &mut chars).expect("20-byte buffer always hexlifies into 40 chars");
        write!(f, "{}", std::str::from_utf8(&chars).expect("bin2hex output is ASCII"))
    }
}

impl std::str::FromStr for InfoHash {
    type Err = binascii::ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != INFO_HASH_BYTES_LEN * 2 {
            return Err(binascii::ConvertError::InvalidInputLength);
        }
        let mut bytes = [0u8; INFO_HASH_BYTES_LEN];
        binascii::hex2bin(s.as_bytes(), &mut bytes)?;
        Ok(Self(aquatic_udp_protocol::InfoHash(bytes)))
    }
}

impl From<[u8; INFO_HASH_BYTES_LEN]> for InfoHash {
    fn from(bytes: [u8; INFO_HASH_BYTES_LEN]) -> Self {
        Self(aquatic_udp_protocol::InfoHash(bytes))
    }
}

/// Errors converting a byte slice that is not exactly 20 bytes long.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("not enough bytes for an info-hash: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    #[error("too many bytes for an info-hash: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

impl TryFrom<&[u8]> for InfoHash {
    type Error = ConversionError;

    #[track_caller]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len().cmp(&INFO_HASH_BYTES_LEN) {
            std::cmp::Ordering::Less => Err(ConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format!("got {} bytes, expected {INFO_HASH_BYTES_LEN}", bytes.len()),
            }),
            std::cmp::Ordering::Greater => Err(ConversionError::TooManyBytes {
                location: Location::caller(),
                message: format!("got {} bytes, expected {INFO_HASH_BYTES_LEN}", bytes.len()),
            }),
            std::cmp::Ordering::Equal => {
                let mut array = [0u8; INFO_HASH_BYTES_LEN];
                array.copy_from_slice(bytes);
                Ok(Self::from(array))
            }
        }
    }
}

impl serde::ser::Serialize for InfoHash {
    fn serialize<S: serde::ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> serde::de::Deserialize<'de> for InfoHash {
    fn deserialize<D: serde::de::Deserializer<'de>>(des: D) -> Result<Self, D::Error> {
        des.deserialize_str(InfoHashVisitor)
    }
}

struct InfoHashVisitor;

impl serde::de::Visitor<'_> for InfoHashVisitor {
    type Value = InfoHash;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "a 40 character hex-encoded info-hash")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| serde::de::Error::invalid_value(serde::de::Unexpected::Str(v), &"a 40 character hex string"))
    }
}

#[cfg(test)]
mod tests {
    use super::InfoHash;

    #[test]
    fn displays_as_lowercase_hex() {
        let ih = InfoHash::from([0xabu8; 20]);
        assert_eq!(ih.to_string(), "ab".repeat(20));
    }

    #[test]
    fn round_trips_through_its_hex_string() {
        let ih = InfoHash::from([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]);
        let parsed: InfoHash = ih.to_hex_string().parse().unwrap();
        assert_eq!(ih, parsed);
    }

    #[test]
    fn rejects_a_slice_with_the_wrong_length() {
        assert!(InfoHash::try_from(&[0u8; 19][..]).is_err());
        assert!(InfoHash::try_from(&[0u8; 21][..]).is_err());
    }
}
