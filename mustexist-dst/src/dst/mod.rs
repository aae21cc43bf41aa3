//! DST - Deterministic Simulation Testing
//!
//! Seeded randomness and fault injection for the simulated stores.
//!
//! Run with an explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod config;
mod fault;
mod rng;

pub use config::SimConfig;
pub use fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
pub use rng::{test_seeds, DeterministicRng};
