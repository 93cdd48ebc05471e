use thiserror::Error;

/// Errors returned by [`crate::SwarmStore`] operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The swarm, or the peer inside it, does not exist.
    #[error("resource does not exist")]
    ResourceDoesNotExist,
    /// The store has been stopped and no longer accepts operations.
    #[error("the swarm store has been stopped")]
    Stopped,
}
