//! The HTTP tracker frontend: announce/scrape over plain bencoded HTTP, per
//! [BEP 3](https://www.bittorrent.org/beps/bep_0003.html).
pub mod extractors;
pub mod handlers;
pub mod responses;
pub mod routes;
pub mod server;

pub use server::{AppState, HttpError, Running, Server, Stopped};
