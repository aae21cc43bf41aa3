//! DeterministicRng - Seeded Random Number Generator
//!
//! TigerStyle: ChaCha20-based RNG for deterministic simulation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::constants::DST_TEST_SEEDS_COUNT_MIN;

/// Golden-ratio increment used to spread fork seeds.
const FORK_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// A deterministic random number generator.
///
/// TigerStyle:
/// - Same seed always produces same sequence
/// - Fork creates independent streams
/// - All simulated store randomness flows through this
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    rng: ChaCha20Rng,
    seed: u64,
    fork_counter: u64,
}

impl DeterministicRng {
    /// Create a new RNG with the given seed.
    ///
    /// # Example
    /// ```
    /// use mustexist_dst::DeterministicRng;
    /// let mut rng = DeterministicRng::new(42);
    /// let value = rng.next_float();
    /// assert!((0.0..1.0).contains(&value));
    /// ```
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Get the original seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random float in [0, 1).
    pub fn next_float(&mut self) -> f64 {
        let value = self.rng.gen::<f64>();

        // Postcondition
        assert!((0.0..1.0).contains(&value), "float must be in [0, 1)");
        value
    }

    /// Generate a random u64.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Generate a random usize in [min, max] (inclusive).
    ///
    /// # Panics
    /// Panics if min > max.
    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        // Precondition
        assert!(min <= max, "min ({min}) must be <= max ({max})");

        self.rng.gen_range(min..=max)
    }

    /// Generate a random u64 in [min, max] (inclusive).
    ///
    /// # Panics
    /// Panics if min > max.
    pub fn next_u64_in(&mut self, min: u64, max: u64) -> u64 {
        assert!(min <= max, "min ({min}) must be <= max ({max})");

        self.rng.gen_range(min..=max)
    }

    /// Generate a random boolean with the given probability of true.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    pub fn next_bool(&mut self, probability: f64) -> bool {
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1], got {probability}"
        );

        self.next_float() < probability
    }

    /// Choose a random element from a slice.
    ///
    /// # Panics
    /// Panics if the slice is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot choose from empty slice");

        let index = self.next_usize(0, items.len() - 1);
        &items[index]
    }

    /// Shuffle a mutable slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(0, i);
            items.swap(i, j);
        }
    }

    /// Create an independent fork of this RNG.
    ///
    /// Each simulated store forks its own stream so adding a store to a
    /// scenario does not shift the faults another store sees.
    ///
    /// ```
    /// use mustexist_dst::DeterministicRng;
    /// let mut rng = DeterministicRng::new(42);
    /// let fork1 = rng.fork();
    /// let fork2 = rng.fork();
    /// assert_ne!(fork1.seed(), fork2.seed());
    /// ```
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(FORK_SEED_STRIDE));

        Self::new(fork_seed)
    }
}

/// Generate a set of test seeds including edge cases.
///
/// Returns seeds: [0, 1, 42, random, random, ...]. The random tail is
/// derived from wall-clock time, so failing seeds must be reported by the
/// test that uses them.
///
/// # Panics
/// Panics if `count` is below the number of fixed edge-case seeds.
#[must_use]
pub fn test_seeds(count: usize) -> Vec<u64> {
    assert!(
        count >= DST_TEST_SEEDS_COUNT_MIN,
        "need at least {DST_TEST_SEEDS_COUNT_MIN} seeds for edge cases"
    );

    let mut seeds = vec![0, 1, 42];

    let time_seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(12345, |d| d.subsec_nanos().into());
    let mut rng = DeterministicRng::new(time_seed);

    while seeds.len() < count {
        seeds.push(rng.next_u64());
    }

    seeds
}
