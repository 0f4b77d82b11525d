//! Simulated environment with a virtual wall clock and seeded RNG.
//!
//! Time only moves when a test moves it, so window boundaries and minute
//! buckets can be hit to the millisecond.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use hourglass_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Deterministic environment for tests.
///
/// Clones share the same clock and RNG, so a protocol instance and the test
/// driving it observe the same time.
#[derive(Clone)]
pub struct SimEnv {
    clock_ms: Arc<AtomicU64>,
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl SimEnv {
    /// Virtual start time: 2023-11-14T22:13:20Z.
    pub const DEFAULT_START_MS: u64 = 1_700_000_000_000;

    /// Create an environment seeded with `seed`, starting at
    /// [`Self::DEFAULT_START_MS`].
    pub fn with_seed(seed: u64) -> Self {
        Self::starting_at(seed, Self::DEFAULT_START_MS)
    }

    /// Create an environment seeded with `seed`, starting at `start_ms`.
    pub fn starting_at(seed: u64, start_ms: u64) -> Self {
        Self {
            clock_ms: Arc::new(AtomicU64::new(start_ms)),
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
        }
    }

    /// Move the clock to an absolute time.
    ///
    /// Unlike a monotonic clock, wall-clock time may be set backwards to
    /// model skew between servers.
    pub fn set_millis(&self, at_ms: u64) {
        self.clock_ms.store(at_ms, Ordering::SeqCst);
    }

    /// Advance the clock by `duration`.
    pub fn advance(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.advance_millis(millis);
    }

    /// Advance the clock by `millis` milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        let previous = self.clock_ms.fetch_add(millis, Ordering::SeqCst);
        tracing::trace!(from = previous, by = millis, "sim clock advanced");
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Environment for SimEnv {
    fn now_millis(&self) -> u64 {
        self.clock_ms.load(Ordering::SeqCst)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}
