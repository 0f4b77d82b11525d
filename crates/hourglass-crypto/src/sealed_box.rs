//! Opaque sealed box using `XChaCha20-Poly1305`
//!
//! Seals arbitrary bytes under the server's sealing key into a transportable
//! string. The nonce is supplied by the caller so sealing stays a pure
//! function.
//!
//! Wire format: `base64url_nopad(nonce[24] || ciphertext || tag[16])`

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of the `XChaCha20` nonce (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const POLY1305_TAG_SIZE: usize = 16;

/// Authenticated encryption envelope keyed by a server-held secret.
#[derive(Clone)]
pub struct SealedBox {
    key: [u8; 32],
}

impl SealedBox {
    /// Create a sealed box from a 32-byte key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self { key: *key }
    }

    /// Seal `plaintext` and encode it as a base64url string.
    ///
    /// # Security
    ///
    /// - Caller MUST provide a fresh random nonce per call in production
    /// - Authenticated encryption prevents tampering
    pub fn seal(&self, plaintext: &[u8], nonce: [u8; NONCE_SIZE]) -> String {
        let cipher = XChaCha20Poly1305::new((&self.key).into());

        let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), plaintext) else {
            unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
        };

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        URL_SAFE_NO_PAD.encode(blob)
    }

    /// Decode and open a sealed string.
    ///
    /// # Errors
    ///
    /// - `InvalidEncoding`: not unpadded base64url
    /// - `Truncated`: shorter than nonce plus tag
    /// - `DecryptionFailed`: authentication tag or key is incorrect (tamper)
    pub fn unseal(&self, sealed: &str) -> Result<Vec<u8>, CryptoError> {
        let blob = URL_SAFE_NO_PAD
            .decode(sealed.trim())
            .map_err(|e| CryptoError::InvalidEncoding { reason: e.to_string() })?;

        let min = NONCE_SIZE + POLY1305_TAG_SIZE;
        if blob.len() < min {
            return Err(CryptoError::Truncated { len: blob.len(), min });
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        let cipher = XChaCha20Poly1305::new((&self.key).into());

        cipher.decrypt(XNonce::from_slice(nonce), ciphertext).map_err(|_| {
            CryptoError::DecryptionFailed { reason: "authentication failed".to_string() }
        })
    }
}

impl std::fmt::Debug for SealedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedBox").finish_non_exhaustive()
    }
}

impl Drop for SealedBox {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_box() -> SealedBox {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = (i * 3) as u8;
        }
        SealedBox::new(&key)
    }

    #[test]
    fn seal_unseal_roundtrip() {
        let sealed_box = test_box();
        let sealed = sealed_box.seal(br#"{"p":"hunter2","s":"abc"}"#, [0xAB; NONCE_SIZE]);

        let opened = sealed_box.unseal(&sealed).unwrap();

        assert_eq!(opened, br#"{"p":"hunter2","s":"abc"}"#);
    }

    #[test]
    fn sealed_string_is_url_safe() {
        let sealed = test_box().seal(&[0xFF; 100], [0x3E; NONCE_SIZE]);

        assert!(sealed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn different_nonces_produce_different_ciphertexts() {
        let sealed_box = test_box();

        let a = sealed_box.seal(b"secret", [0x00; NONCE_SIZE]);
        let b = sealed_box.seal(b"secret", [0xFF; NONCE_SIZE]);

        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = test_box().seal(b"secret", [0x01; NONCE_SIZE]);
        let other = SealedBox::new(&[0x42; 32]);

        let result = other.unseal(&sealed);

        assert!(matches!(
            result,
            Err(CryptoError::DecryptionFailed { reason }) if reason.contains("authentication")
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let sealed_box = test_box();
        let sealed = sealed_box.seal(b"original secret", [0x00; NONCE_SIZE]);

        let mut blob = URL_SAFE_NO_PAD.decode(&sealed).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(blob);

        assert!(sealed_box.unseal(&tampered).is_err());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result = test_box().unseal("not base64 at all!");

        assert!(matches!(result, Err(CryptoError::InvalidEncoding { .. })));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let short = URL_SAFE_NO_PAD.encode([0u8; 20]);

        let result = test_box().unseal(&short);

        assert_eq!(result, Err(CryptoError::Truncated { len: 20, min: 40 }));
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let sealed_box = test_box();
        let sealed = sealed_box.seal(b"", [0x07; NONCE_SIZE]);

        assert_eq!(sealed_box.unseal(&sealed).unwrap(), b"");
    }
}
