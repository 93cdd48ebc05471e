//! Background tasks started alongside the two frontends.
pub mod jwk_refresh;
pub mod swarm_cleanup;
