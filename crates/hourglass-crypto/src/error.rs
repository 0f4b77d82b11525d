//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors from opening a sealed secret.
///
/// Sealing and MAC derivation are infallible; only decoding and
/// authenticating untrusted ciphertext can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Sealed string is not valid unpadded base64url
    #[error("sealed secret is not valid base64url: {reason}")]
    InvalidEncoding {
        /// Decoder error message
        reason: String,
    },

    /// Decoded bytes are shorter than nonce plus tag
    #[error("sealed secret too short: {len} bytes, need at least {min}")]
    Truncated {
        /// Length of the decoded blob
        len: usize,
        /// Minimum valid length
        min: usize,
    },

    /// AEAD authentication failed (wrong key or tampered ciphertext)
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Description of the failure
        reason: String,
    },
}
