//! A small bencode codec: integers as `i<decimal>e`, byte strings as
//! `<len>:<bytes>`, lists as `l<items>e`, dictionaries as
//! `d<sorted key-value pairs>e`.
//!
//! [`encode`] always produces the canonical, sorted-key form. [`decode`]
//! accepts dictionaries in any key order (not every bencode producer in the
//! wild sorts) but rejects trailing bytes after the top-level value.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use decode::decode;
pub use encode::encode;
pub use error::DecodeError;
pub use value::Value;
