//! The announce/scrape request pipeline: a fixed sanitize/response/
//! swarm-interaction skeleton with a caller-configured slot for optional
//! hooks (client approval, JWT verification, interval jitter) in between.
//!
//! Pre-hooks run serially and can short-circuit the pipeline with a
//! [`error::ClientError`]; the swarm-interaction post-hook runs after the
//! response has already been handed back to the frontend and only ever
//! logs its failures. See [`pipeline::Pipeline`] for the composition.

pub mod context;
pub mod error;
pub mod hooks;
pub mod pipeline;

pub use error::ClientError;
pub use hooks::{ClientApproval, Jwt, Varinterval};
pub use pipeline::{AnnounceHook, AnnounceRequest, AnnounceResponse, Pipeline, ScrapeRequest, ScrapeResponse};
