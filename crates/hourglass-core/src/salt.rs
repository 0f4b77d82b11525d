//! Per-session salt generation.

use crate::env::Environment;

/// Length of every generated salt: 11 hex digits of time, 16 of randomness.
pub const SALT_LEN: usize = 27;

/// Generate a fresh session salt.
///
/// Mixes the wall-clock millisecond timestamp with a 64-bit random value.
/// Both halves are fixed width, so a salt followed by a decimal field in a
/// MAC input can always be split unambiguously.
///
/// Salts are public binding labels, not secrets; uniqueness only needs to be
/// practical, not cryptographically enforced.
pub fn generate_salt<E: Environment>(env: &E) -> String {
    // 11 hex digits cover timestamps until the year 2527
    let time = env.now_millis() & 0xFFF_FFFF_FFFF;
    format!("{time:011x}{:016x}", env.random_u64())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    use super::*;

    /// Minimal environment: fixed clock, counter-based "randomness".
    #[derive(Clone)]
    struct CountingEnv {
        now: u64,
        counter: Arc<AtomicU64>,
    }

    impl Environment for CountingEnv {
        fn now_millis(&self) -> u64 {
            self.now
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let value = self.counter.fetch_add(1, Ordering::Relaxed).to_be_bytes();
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = value[i % value.len()];
            }
        }
    }

    fn env(now: u64) -> CountingEnv {
        CountingEnv { now, counter: Arc::new(AtomicU64::new(1)) }
    }

    #[test]
    fn salt_has_fixed_length() {
        assert_eq!(generate_salt(&env(0)).len(), SALT_LEN);
        assert_eq!(generate_salt(&env(1_700_000_000_000)).len(), SALT_LEN);
    }

    #[test]
    fn salt_is_lowercase_hex() {
        let salt = generate_salt(&env(1_700_000_000_000));

        assert!(salt.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn salt_embeds_timestamp_prefix() {
        let salt = generate_salt(&env(0x18B_CFE5_6800));

        assert!(salt.starts_with("18bcfe56800"));
    }

    #[test]
    fn same_instant_produces_distinct_salts() {
        let env = env(1_700_000_000_000);

        let a = generate_salt(&env);
        let b = generate_salt(&env);

        assert_ne!(a, b);
    }
}
