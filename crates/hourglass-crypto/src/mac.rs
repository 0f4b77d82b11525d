//! Keyed MAC used to bind public values to the server key
//!
//! # Security Properties
//!
//! - Determinism: same key and message always produce the same digest
//! - Unforgeability: HMAC-SHA256, infeasible to compute without the key
//! - Key hygiene: key material is zeroized on drop

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 keyed with a server-resident secret.
#[derive(Clone)]
pub struct KeyedMac {
    key: [u8; 32],
}

impl KeyedMac {
    /// Create a MAC from a 32-byte key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self { key: *key }
    }

    /// Raw 32-byte digest over the concatenation of `parts`.
    ///
    /// Parts are fed to the MAC back to back with no separator. Callers that
    /// need unambiguous framing must supply fixed-width fields or explicit
    /// delimiters.
    pub fn digest(&self, parts: &[&[u8]]) -> [u8; 32] {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        for part in parts {
            mac.update(part);
        }
        let result = mac.finalize().into_bytes();

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }

    /// Lowercase hex digest over the concatenation of string `parts`.
    pub fn hex_digest(&self, parts: &[&str]) -> String {
        let bytes: Vec<&[u8]> = parts.iter().map(|p| p.as_bytes()).collect();
        hex::encode(self.digest(&bytes))
    }
}

impl std::fmt::Debug for KeyedMac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedMac").finish_non_exhaustive()
    }
}

impl Drop for KeyedMac {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Length is not secret: inputs of different lengths compare unequal
/// immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn digest_is_deterministic() {
        let mac = KeyedMac::new(&test_key());

        assert_eq!(mac.digest(&[b"hello".as_slice()]), mac.digest(&[b"hello".as_slice()]));
    }

    #[test]
    fn parts_are_concatenated() {
        let mac = KeyedMac::new(&test_key());

        let split = mac.digest(&[b"hel".as_slice(), b"lo".as_slice()]);
        assert_eq!(split, mac.digest(&[b"hello".as_slice()]));
        assert_eq!(mac.hex_digest(&["token_", "abc", "900"]), mac.hex_digest(&["token_abc900"]));
    }

    #[test]
    fn different_keys_produce_different_digests() {
        let mut other = test_key();
        other[0] ^= 0xFF;

        let a = KeyedMac::new(&test_key()).digest(&[b"message".as_slice()]);
        let b = KeyedMac::new(&other).digest(&[b"message".as_slice()]);

        assert_ne!(a, b);
    }

    #[test]
    fn hex_digest_is_lowercase_64_chars() {
        let mac = KeyedMac::new(&test_key());
        let digest = mac.hex_digest(&["anything"]);

        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn known_answer_rfc4231_case_2() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
        let Ok(mut mac) = HmacSha256::new_from_slice(b"Jefe") else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(b"what do ya want for nothing?");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(
            expected,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn constant_time_eq_matches_equality() {
        assert!(constant_time_eq(b"temp_abc", b"temp_abc"));
        assert!(!constant_time_eq(b"temp_abc", b"temp_abd"));
        assert!(!constant_time_eq(b"temp_abc", b"temp_ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let mac = KeyedMac::new(&test_key());
        assert_eq!(format!("{mac:?}"), "KeyedMac { .. }");
    }
}
