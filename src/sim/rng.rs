//! Seeded random stream with a draw counter
//!
//! Every random value in the simulation goes through `SimRng::draw_uniform`,
//! so `(seed, draws)` fully identifies the position in the stream. Saving
//! that pair and replaying it through `reseed` resumes the exact sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Seeds picked for unseeded games fall in this range
const MAX_RANDOM_SEED: u64 = 1_000_000_000;

/// Resumption key for a `SimRng` (what gets serialized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    /// Rebuild the stream this key describes
    pub fn to_rng(&self) -> SimRng {
        let mut rng = SimRng::new(self.seed);
        rng.skip(self.draws);
        rng
    }
}

/// The simulation's single source of randomness
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RngState", into = "RngState")]
pub struct SimRng {
    seed: u64,
    draws: u64,
    stream: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            stream: Pcg32::seed_from_u64(seed),
        }
    }

    /// Start from a seed picked by the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(random_seed())
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            draws: self.draws,
        }
    }

    /// Draw a value uniformly from `[lo, hi)`. Always consumes exactly one
    /// sample from the underlying stream.
    pub fn draw_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.draws += 1;
        let unit: f64 = self.stream.random();
        lo + (hi - lo) * unit
    }

    /// Discard `count` draws
    fn skip(&mut self, count: u64) {
        for _ in 0..count {
            self.draw_uniform(0.0, 1.0);
        }
    }

    /// Move the stream to `(seed, draws)`.
    ///
    /// A missing seed picks a fresh one. A different seed rebuilds the
    /// stream. The same seed fast-forwards when `draws` is ahead, and
    /// rebuilds from zero when it is behind (the stream cannot rewind).
    pub fn reseed(&mut self, seed: Option<u64>, draws: u64) {
        match seed {
            None => {
                *self = SimRng::from_entropy();
                self.skip(draws);
            }
            Some(seed) if seed != self.seed => {
                *self = RngState { seed, draws }.to_rng();
            }
            Some(_) if draws >= self.draws => {
                self.skip(draws - self.draws);
            }
            Some(seed) => {
                *self = RngState { seed, draws }.to_rng();
            }
        }
        log::debug!("rng reseeded to seed {} at draw {}", self.seed, self.draws);
    }
}

impl From<RngState> for SimRng {
    fn from(state: RngState) -> Self {
        state.to_rng()
    }
}

impl From<SimRng> for RngState {
    fn from(rng: SimRng) -> Self {
        rng.state()
    }
}

fn random_seed() -> u64 {
    rand::rng().random_range(0..MAX_RANDOM_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn take(rng: &mut SimRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.draw_uniform(0.0, 360.0)).collect()
    }

    #[test]
    fn test_draws_are_counted_and_in_range() {
        let mut rng = SimRng::new(7);
        for _ in 0..100 {
            let v = rng.draw_uniform(5.0, 15.0);
            assert!((5.0..15.0).contains(&v));
        }
        assert_eq!(rng.draws(), 100);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SimRng::new(649_766_108);
        let mut b = SimRng::new(649_766_108);
        assert_eq!(take(&mut a, 20), take(&mut b, 20));
    }

    #[test]
    fn test_reseed_backwards_rebuilds() {
        let mut reference = SimRng::new(42);
        take(&mut reference, 3);
        let expected = take(&mut reference, 5);

        let mut rng = SimRng::new(42);
        take(&mut rng, 10);
        rng.reseed(Some(42), 3);
        assert_eq!(rng.draws(), 3);
        assert_eq!(take(&mut rng, 5), expected);
    }

    #[test]
    fn test_reseed_forward_same_seed() {
        let mut reference = SimRng::new(42);
        take(&mut reference, 8);
        let expected = take(&mut reference, 4);

        let mut rng = SimRng::new(42);
        take(&mut rng, 2);
        rng.reseed(Some(42), 8);
        assert_eq!(take(&mut rng, 4), expected);
    }

    #[test]
    fn test_reseed_new_seed() {
        let mut rng = SimRng::new(1);
        take(&mut rng, 4);
        rng.reseed(Some(2), 0);
        assert_eq!(rng.seed(), 2);
        assert_eq!(rng.draws(), 0);
        let mut fresh = SimRng::new(2);
        assert_eq!(take(&mut rng, 3), take(&mut fresh, 3));
    }

    #[test]
    fn test_reseed_without_seed_picks_one() {
        let mut rng = SimRng::new(1);
        rng.reseed(None, 5);
        assert!(rng.seed() < MAX_RANDOM_SEED);
        assert_eq!(rng.draws(), 5);
    }

    #[test]
    fn test_serde_keeps_position() {
        let mut rng = SimRng::new(99);
        take(&mut rng, 11);
        let json = serde_json::to_string(&rng).unwrap();
        assert!(json.contains("\"draws\":11"));
        let mut restored: SimRng = serde_json::from_str(&json).unwrap();
        assert_eq!(take(&mut restored, 6), take(&mut rng, 6));
    }

    proptest! {
        #[test]
        fn prop_resume_matches_uninterrupted(seed in 0u64..1_000_000_000, n in 0usize..200, m in 1usize..50) {
            let mut straight = SimRng::new(seed);
            take(&mut straight, n);
            let key = straight.state();
            let tail = take(&mut straight, m);

            let mut resumed = SimRng::new(seed.wrapping_add(1));
            resumed.reseed(Some(key.seed), key.draws);
            prop_assert_eq!(take(&mut resumed, m), tail);
        }
    }
}
