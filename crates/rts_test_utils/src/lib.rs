//! # RTS Test Utilities
//!
//! Shared testing utilities for the pathfinding crates:
//! - Map fixtures and benchmark scenarios
//! - Brute-force reference solver
//! - Path validation helpers
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod paths;
pub mod reference;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;

/// Install a `tracing` subscriber for tests.
///
/// Output is filtered by `RUST_LOG` and captured by the test harness.
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
