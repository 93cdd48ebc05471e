//! The UDP tracker frontend: connect/announce/scrape over the well-known
//! `BitTorrent` UDP tracker protocol (`aquatic_udp_protocol`).
pub mod connection;
pub mod handlers;
pub mod server;

pub use server::{Running, Server, Stopped, UdpError};
