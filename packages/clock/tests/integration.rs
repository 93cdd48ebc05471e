//! Integration tests.
//!
//! ```text
//! cargo test --test integration
//! ```

mod clock;

/// This code needs to be copied into each crate that wants test-time
/// control.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = glowworm_clock::clock::Working;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = glowworm_clock::clock::Stopped;
