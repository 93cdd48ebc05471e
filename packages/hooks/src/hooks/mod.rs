//! Built-in pipeline stages ([`sanitize`], [`response`], [`swarm_interaction`])
//! and the optional, user-configured [`AnnounceHook`](crate::pipeline::AnnounceHook)
//! implementations.

pub mod client_approval;
pub mod jwt;
pub mod response;
pub mod sanitize;
pub mod swarm_interaction;
pub mod varinterval;

pub use client_approval::ClientApproval;
pub use jwt::Jwt;
pub use varinterval::Varinterval;
