use serde::{Deserialize, Serialize};

/// Sizing and lifetime knobs for the in-memory swarm store.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct Storage {
    /// Number of independently locked shards. Must be a power of two.
    #[serde(default = "Storage::default_shard_count")]
    pub shard_count: usize,

    /// Seconds a peer may go unseen before garbage collection evicts it.
    #[serde(default = "Storage::default_peer_lifetime")]
    pub peer_lifetime: u64,

    /// Seconds between garbage collection sweeps.
    #[serde(default = "Storage::default_gc_interval")]
    pub gc_interval: u64,
}

impl Storage {
    fn default_shard_count() -> usize {
        1024
    }

    fn default_peer_lifetime() -> u64 {
        900
    }

    fn default_gc_interval() -> u64 {
        600
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            shard_count: Self::default_shard_count(),
            peer_lifetime: Self::default_peer_lifetime(),
            gc_interval: Self::default_gc_interval(),
        }
    }
}
