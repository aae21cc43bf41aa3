//! Mustexist DST - Deterministic Simulation Toolkit
//!
//! TigerStyle: every simulated store draws its randomness from one seed.
//!
//! The in-memory stores in `mustexist` use this crate to fail and stall
//! deterministically, so a failing existence check can be replayed
//! bit-for-bit with `DST_SEED=<seed>`.
//!
//! ```rust
//! use mustexist_dst::{DeterministicRng, FaultConfig, FaultInjectorBuilder, FaultType};
//!
//! let injector = FaultInjectorBuilder::new(DeterministicRng::new(42))
//!     .with_fault(FaultConfig::new(FaultType::ProbeTimeout, 1.0).with_filter("by_id"))
//!     .build();
//!
//! assert_eq!(injector.should_inject("exists_by_id"), Some(FaultType::ProbeTimeout));
//! assert!(injector.should_inject("exists_by_props").is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod dst;

pub use dst::{
    test_seeds, DeterministicRng, FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType,
    SimConfig,
};
