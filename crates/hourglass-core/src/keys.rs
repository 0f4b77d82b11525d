//! Server key material.
//!
//! The master key is the only long-lived secret. Everything else is derived
//! from it once at startup and is read-only afterwards.

use hourglass_crypto::{
    KeyedMac, MAC_KEY_LABEL, RELEASE_KEY_LABEL, SEAL_KEY_LABEL, SealedBox, derive_key,
};
use zeroize::Zeroizing;

/// Keys derived from the master key.
#[derive(Clone)]
pub struct ServerKeys {
    mac: KeyedMac,
    sealer: SealedBox,
    release: Zeroizing<Vec<u8>>,
}

impl ServerKeys {
    /// Derive all protocol keys from a 32-byte master key.
    pub fn from_master(master: &[u8; 32]) -> Self {
        Self {
            mac: KeyedMac::new(&derive_key(master, MAC_KEY_LABEL)),
            sealer: SealedBox::new(&derive_key(master, SEAL_KEY_LABEL)),
            release: Zeroizing::new(derive_key(master, RELEASE_KEY_LABEL).to_vec()),
        }
    }

    /// Replace the derived release key with an explicitly configured
    /// secondary secret.
    #[must_use]
    pub fn with_release_secret(mut self, secret: &[u8]) -> Self {
        self.release = Zeroizing::new(secret.to_vec());
        self
    }

    /// MAC used for every proof.
    pub fn mac(&self) -> &KeyedMac {
        &self.mac
    }

    /// Sealed box for client secrets.
    pub fn sealer(&self) -> &SealedBox {
        &self.sealer
    }

    /// Secondary secret bound into hash-chain release modes.
    pub fn release_key(&self) -> &[u8] {
        &self.release
    }
}

impl std::fmt::Debug for ServerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeys").finish_non_exhaustive()
    }
}
