//! Time related functions and types.
//!
//! It's usually a good idea to control where the time comes from in an
//! application so that it can be mocked for testing and so the whole
//! process agrees on one notion of "now" regardless of the host's local
//! time zone.
//!
//! Clocks use [`glowworm_primitives::DurationSinceUnixEpoch`], a
//! `std::time::Duration` since the Unix epoch.

pub mod clock;

/// This code needs to be copied into each crate that wants test-time
/// control: the working clock in production, the stopped clock in tests.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
