//! `glowworm-tracker`: a `BitTorrent` tracker built around a sharded
//! in-memory swarm store ([`glowworm_swarm_store`]) and a pluggable
//! announce/scrape request pipeline ([`glowworm_hooks`]).
//!
//! This crate wires those two packages to a pair of network frontends
//! ([`udp`], [`http`]) and the [`bootstrap`] routine that constructs and
//! starts them from a loaded [`glowworm_configuration::Configuration`].
pub mod bootstrap;
pub mod http;
pub mod udp;
