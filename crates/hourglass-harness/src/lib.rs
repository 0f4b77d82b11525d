//! Deterministic simulation harness for Hourglass protocol testing.
//!
//! Implements the [`hourglass_core::Environment`] trait with a virtual wall
//! clock and a seeded RNG, so every test run issues the same salts and
//! crosses window boundaries at exactly the same millisecond.
//!
//! # Scenarios
//!
//! The `scenario` module drives complete temp and direct flows so tests can
//! start from a valid unlock window and probe one step at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod scenario;
pub mod sim_env;

pub use scenario::{Scenario, TEST_MASTER_KEY, TempFlow};
pub use sim_env::SimEnv;
