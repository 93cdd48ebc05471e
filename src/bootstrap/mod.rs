//! Wires a loaded configuration into a runnable tracker: the peer store,
//! the hook pipeline, the UDP/HTTP frontends, and their background jobs.
pub mod app;
pub mod config;
pub mod jobs;
pub mod logging;

pub use app::{App, BootstrapError};
