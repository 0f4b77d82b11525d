//! Hash-chain steps used to shape released secrets
//!
//! Pure functions over caller-supplied state. No hash context outlives a
//! call.

use sha2::{Digest, Sha256};

/// One hash-chain step: `hex(SHA256(binding || link))`.
///
/// `binding` is a server-held secret, so the step cannot be recomputed by a
/// client that only knows `link`.
pub fn chain_step(link: &str, binding: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(binding);
    hasher.update(link.as_bytes());
    hex::encode(hasher.finalize())
}

/// Two chained steps over two inputs.
///
/// `step(step(first) || second)`. Used for OTP-style release where `second`
/// carries a caller challenge and a time counter.
pub fn double_chain_step(first: &str, second: &str, binding: &[u8]) -> String {
    let inner = chain_step(first, binding);
    chain_step(&format!("{inner}{second}"), binding)
}
