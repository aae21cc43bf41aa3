//! `TigerStyle` Constants
//!
//! Big-endian naming with units: `CATEGORY_SPECIFICS_UNIT_LIMIT`.

/// Maximum probability for fault injection (1.0 = 100%)
pub const DST_FAULT_PROBABILITY_MAX: f64 = 1.0;

/// Maximum simulated latency for a single store probe in milliseconds
pub const DST_LATENCY_MS_MAX: u64 = 10_000; // 10 seconds

/// Minimum number of seeds returned by `test_seeds` (the fixed edge cases)
pub const DST_TEST_SEEDS_COUNT_MIN: usize = 3;

/// Environment variable holding the replay seed
pub const DST_SEED_ENV_VAR: &str = "DST_SEED";
