//! A small, fast pseudo-random generator for hot paths that don't need
//! cryptographic strength: sampling a handful of peers out of a swarm, and
//! jittering an announce interval by a few seconds.
//!
//! xorshift128+ was picked over `rand`'s default generator because callers
//! here (the swarm store's peer sampling, the `varinterval` hook) run on
//! every announce and a full `ChaCha`-based CSPRNG is unnecessary overhead
//! for output that is never security-sensitive.

use std::sync::Mutex;

use rand::Rng;

/// A xorshift128+ generator. Not thread-safe on its own — see [`LockedPrng`]
/// for a version callers can share across tasks.
#[derive(Debug, Clone)]
pub struct Prng {
    state: [u64; 2],
}

impl Prng {
    /// Seeds the generator from the OS random source. The two state words
    /// must not both be zero, which an OS-seeded `u64` pair practically
    /// never is; the tiny residual risk is handled by nudging a zero word
    /// to `1`.
    #[must_use]
    pub fn new() -> Self {
        let mut seed = [0u8; 16];
        rand::rng().fill_bytes(&mut seed);
        let mut state = [
            u64::from_le_bytes(seed[0..8].try_into().unwrap()),
            u64::from_le_bytes(seed[8..16].try_into().unwrap()),
        ];
        if state == [0, 0] {
            state = [1, 1];
        }
        Self { state }
    }

    #[must_use]
    pub fn from_seed(state: [u64; 2]) -> Self {
        let state = if state == [0, 0] { [1, 1] } else { state };
        Self { state }
    }

    /// Advances the generator and returns the next 64-bit word.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state[0];
        let y = self.state[1];
        self.state[0] = y;
        x ^= x << 23;
        x ^= x >> 17;
        x ^= y ^ (y >> 26);
        self.state[1] = x;
        x.wrapping_add(y)
    }

    /// Samples a value in `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0` — there's no such range to sample from.
    pub fn intn(&mut self, n: u64) -> u64 {
        assert!(n > 0, "intn requires a positive upper bound");
        self.next_u64() % n
    }

    /// Samples an integer in `[low, high]` inclusive, as used by the
    /// announce-interval jitter (`[1, MaxIncreaseDelta]` seconds).
    ///
    /// # Panics
    ///
    /// Panics if `low > high`.
    pub fn range_inclusive(&mut self, low: u64, high: u64) -> u64 {
        assert!(low <= high, "range_inclusive requires low <= high");
        low + self.intn(high - low + 1)
    }
}

impl Default for Prng {
    fn default() -> Self {
        Self::new()
    }
}

/// A mutex-guarded [`Prng`] for callers that share one generator across
/// concurrent tasks instead of sharding by some key.
#[derive(Debug)]
pub struct LockedPrng(Mutex<Prng>);

impl LockedPrng {
    #[must_use]
    pub fn new() -> Self {
        Self(Mutex::new(Prng::new()))
    }

    pub fn next_u64(&self) -> u64 {
        self.0.lock().expect("prng mutex poisoned").next_u64()
    }

    pub fn intn(&self, n: u64) -> u64 {
        self.0.lock().expect("prng mutex poisoned").intn(n)
    }
}

impl Default for LockedPrng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Prng;

    #[test]
    fn is_deterministic_from_a_fixed_seed() {
        let mut a = Prng::from_seed([1, 2]);
        let mut b = Prng::from_seed([1, 2]);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn diverges_from_a_different_seed() {
        let mut a = Prng::from_seed([1, 2]);
        let mut b = Prng::from_seed([3, 4]);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn intn_stays_within_bounds() {
        let mut prng = Prng::from_seed([42, 7]);
        for _ in 0..1000 {
            assert!(prng.intn(10) < 10);
        }
    }

    #[test]
    #[should_panic(expected = "positive upper bound")]
    fn intn_rejects_a_zero_bound() {
        Prng::from_seed([1, 1]).intn(0);
    }

    #[test]
    fn range_inclusive_stays_within_bounds() {
        let mut prng = Prng::from_seed([9, 9]);
        for _ in 0..1000 {
            let v = prng.range_inclusive(1, 5);
            assert!((1..=5).contains(&v));
        }
    }

    #[test]
    fn a_zero_seed_is_nudged_to_a_nonzero_state() {
        let mut prng = Prng::from_seed([0, 0]);
        assert_ne!(prng.next_u64(), 0);
    }
}
