//! Environment abstraction for deterministic testing.
//!
//! Decouples protocol logic from system resources (wall clock, randomness).
//! Enables deterministic simulation (virtual clock, seeded RNG) and
//! production use with real system resources.

/// Abstract environment providing wall-clock time and randomness.
///
/// Every protocol decision that depends on "now" or on entropy goes through
/// this trait. The protocol itself holds no other mutable resource.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now_millis()` is Unix time in milliseconds (UTC)
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion, a clock set before 1970)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    ///
    /// Unlike a monotonic instant, this value is compared against timestamps
    /// that travel inside tokens and may come from another process, so it
    /// must be real wall-clock time.
    fn now_millis(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    ///
    /// Convenience for salt generation.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
