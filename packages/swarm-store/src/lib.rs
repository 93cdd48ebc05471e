//! A sharded, concurrently mutated peer store: the in-memory table of every
//! swarm (one torrent's peers of one address family) a tracker is serving.
//!
//! Swarms are distributed across a fixed array of independently locked
//! shards (see [`key::SwarmKey::shard_index`]) so that announces for
//! unrelated torrents never contend on the same lock. Garbage collection
//! walks the shards one at a time and yields between them, keeping any
//! single write-lock hold proportional to one shard's stale-peer count
//! rather than the whole store's size.

pub mod error;
pub mod key;
pub mod store;
pub mod swarm;

pub use error::StoreError;
pub use key::SwarmKey;
pub use store::SwarmStore;
pub use swarm::{Swarm, SwarmMetadata};
