//! Hourglass Cryptographic Primitives
//!
//! Cryptographic building blocks for the Hourglass delayed-release protocol.
//! Pure functions with deterministic outputs. Callers provide random bytes
//! (sealing nonces) for deterministic testing.
//!
//! # Key Hierarchy
//!
//! The server holds exactly one long-lived secret, the master key. Every
//! other key is derived from it with HKDF under a distinct label, so the
//! MAC key and the sealing key can never collide.
//!
//! ```text
//! Master Key (32 bytes, resident)
//!        │
//!        ├── HKDF "hourglassMacV1"     → Keyed MAC (proof derivation)
//!        ├── HKDF "hourglassSealV1"    → Sealed Box (XChaCha20-Poly1305)
//!        └── HKDF "hourglassReleaseV1" → Release key (hash-chain steps)
//! ```
//!
//! # Security
//!
//! Unforgeability:
//! - Every proof is an HMAC-SHA256 over public values
//! - Without the MAC key a client cannot produce a proof for a different
//!   salt, delay, timestamp or window
//!
//! Confidentiality:
//! - Sealed secrets are XChaCha20-Poly1305 ciphertexts with a random 24-byte
//!   nonce prepended
//! - Failed authentication tag -> reject
//!
//! Timing:
//! - Presented proofs are compared against re-derived proofs in constant time

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod derivation;
mod error;
mod hash_chain;
mod mac;
mod sealed_box;

pub use derivation::{MAC_KEY_LABEL, RELEASE_KEY_LABEL, SEAL_KEY_LABEL, derive_key};
pub use error::CryptoError;
pub use hash_chain::{chain_step, double_chain_step};
pub use mac::{KeyedMac, constant_time_eq};
pub use sealed_box::{NONCE_SIZE, SealedBox};
