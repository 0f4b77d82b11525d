//! Sub-key derivation from the server master key using HKDF

use hkdf::Hkdf;
use sha2::Sha256;

/// Label for the key that signs every protocol proof
pub const MAC_KEY_LABEL: &[u8] = b"hourglassMacV1";

/// Label for the key that seals client secrets
pub const SEAL_KEY_LABEL: &[u8] = b"hourglassSealV1";

/// Label for the secondary secret used by hash-chain release modes
pub const RELEASE_KEY_LABEL: &[u8] = b"hourglassReleaseV1";

/// Derive a 32-byte purpose-specific key from the master key.
///
/// # Security
///
/// - Different labels produce independent keys (domain separation)
/// - Deterministic: same master and label always produce the same key, so
///   tokens issued before a restart stay valid after it
pub fn derive_key(master: &[u8], label: &[u8]) -> [u8; 32] {
    let hkdf = Hkdf::<Sha256>::new(None, master);

    let mut key = [0u8; 32];
    let Ok(()) = hkdf.expand(label, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &[u8; 32] = b"test_master_key_material_here!!!";

    #[test]
    fn derive_is_deterministic() {
        let a = derive_key(MASTER, MAC_KEY_LABEL);
        let b = derive_key(MASTER, MAC_KEY_LABEL);

        assert_eq!(a, b, "same inputs must produce same output");
    }

    #[test]
    fn labels_are_domain_separated() {
        let mac = derive_key(MASTER, MAC_KEY_LABEL);
        let seal = derive_key(MASTER, SEAL_KEY_LABEL);
        let release = derive_key(MASTER, RELEASE_KEY_LABEL);

        assert_ne!(mac, seal);
        assert_ne!(mac, release);
        assert_ne!(seal, release);
    }

    #[test]
    fn different_masters_produce_different_keys() {
        let a = derive_key(b"master_a________________________", MAC_KEY_LABEL);
        let b = derive_key(b"master_b________________________", MAC_KEY_LABEL);

        assert_ne!(a, b);
    }

    #[test]
    fn works_with_empty_master() {
        let key = derive_key(&[], MAC_KEY_LABEL);
        assert_eq!(key.len(), 32);
    }
}
