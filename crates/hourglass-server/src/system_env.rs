//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` reads the real wall clock and the OS cryptographic RNG.
//! Production behavior is therefore non-deterministic, but token timestamps
//! are comparable across every server sharing the master key.

use std::time::{SystemTime, UNIX_EPOCH};

use hourglass_core::Environment;

/// Production environment using the system clock and cryptographic RNG.
///
/// # Security
///
/// The RNG uses getrandom which provides OS-level cryptographic randomness
/// (e.g., /dev/urandom on Linux, `BCryptGenRandom` on Windows). Salts,
/// sealing nonces and ephemeral master keys all come from here.
///
/// # Panics
///
/// Panics if the OS RNG fails or the clock reads before 1970. A server that
/// cannot draw nonces or tell the time cannot issue tokens safely.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    #[allow(clippy::expect_used)]
    fn now_millis(&self) -> u64 {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)");
        u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - server cannot operate securely");
    }
}
