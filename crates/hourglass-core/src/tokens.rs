//! Token derivations.
//!
//! Every token is a pure function of public values and the MAC key. The
//! server never stores a token; it re-derives the expected value and
//! compares.
//!
//! ```text
//! SetupToken      = fmt(MAC("token_" | salt | delay_secs))
//! TempBeginProof  = "temp_" + hex(MAC("temp_" | salt | delay | create_ms))
//! FastCopyProof   = upper(hex(MAC(delay | salt | minutes | minute_bucket))[..6])
//! UnlockWindow    = "begintime_" + hex(MAC("begintime_" | salt | start | end | sealed))
//! ```
//!
//! Fields are joined with [`FIELD_SEPARATOR`]. Salts and delays are
//! validated to never contain it, so no two distinct field tuples can
//! produce the same MAC input.

use chrono::DateTime;
use hourglass_crypto::{KeyedMac, constant_time_eq};

/// Separator placed between MAC input fields.
pub const FIELD_SEPARATOR: &str = "|";

/// Length of the human-typable fast copy proof.
pub const FAST_PROOF_LEN: usize = 6;

/// Prefix of every temp begin proof.
pub const TEMP_PROOF_PREFIX: &str = "temp_";

/// Prefix of every unlock window proof.
pub const WINDOW_PROOF_PREFIX: &str = "begintime_";

const SETUP_PREFIX: &str = "token_";
const SETUP_BODY_HEX_DIGITS: usize = 20;
const SETUP_GROUP_SIZE: usize = 4;
const SETUP_CHECKSUM_MODULUS: u32 = 97;

/// Derive the setup token binding `salt` to a normalized delay.
///
/// Shape: five groups of four hex digits and a two-digit checksum, e.g.
/// `3f9a-01bc-77de-a410-5c2e-42`.
pub fn setup_token(mac: &KeyedMac, salt: &str, delay_secs: u64) -> String {
    let secs = delay_secs.to_string();
    let digest = mac.digest(&[
        SETUP_PREFIX.as_bytes(),
        FIELD_SEPARATOR.as_bytes(),
        salt.as_bytes(),
        FIELD_SEPARATOR.as_bytes(),
        secs.as_bytes(),
    ]);
    let hex = hex::encode(digest);

    let mut token = String::with_capacity(SETUP_BODY_HEX_DIGITS + 8);
    for (i, c) in hex.chars().take(SETUP_BODY_HEX_DIGITS).enumerate() {
        if i > 0 && i % SETUP_GROUP_SIZE == 0 {
            token.push('-');
        }
        token.push(c);
    }

    let checksum = digest.iter().map(|&b| u32::from(b)).sum::<u32>() % SETUP_CHECKSUM_MODULUS;
    token.push_str(&format!("-{checksum:02}"));
    token
}

/// Derive the proof that a session began at `create_ms`.
pub fn temp_proof(mac: &KeyedMac, salt: &str, delay: &str, create_ms: u64) -> String {
    let create = create_ms.to_string();
    let digest = mac.hex_digest(&[
        TEMP_PROOF_PREFIX,
        FIELD_SEPARATOR,
        salt,
        FIELD_SEPARATOR,
        delay,
        FIELD_SEPARATOR,
        &create,
    ]);
    format!("{TEMP_PROOF_PREFIX}{digest}")
}

/// Derive the short fast copy proof for a minute counter and minute bucket.
pub fn fast_copy_proof(
    mac: &KeyedMac,
    delay: &str,
    salt: &str,
    minutes_elapsed: &str,
    minute_bucket: &str,
) -> String {
    let digest = mac.hex_digest(&[
        delay,
        FIELD_SEPARATOR,
        salt,
        FIELD_SEPARATOR,
        minutes_elapsed,
        FIELD_SEPARATOR,
        minute_bucket,
    ]);
    digest[..FAST_PROOF_LEN].to_ascii_uppercase()
}

/// Derive the proof binding `salt` to an unlock window and a sealed secret.
pub fn window_proof(
    mac: &KeyedMac,
    salt: &str,
    window_start: u64,
    window_end: u64,
    sealed: &str,
) -> String {
    let start = window_start.to_string();
    let end = window_end.to_string();
    let digest = mac.hex_digest(&[
        WINDOW_PROOF_PREFIX,
        FIELD_SEPARATOR,
        salt,
        FIELD_SEPARATOR,
        &start,
        FIELD_SEPARATOR,
        &end,
        FIELD_SEPARATOR,
        sealed,
    ]);
    format!("{WINDOW_PROOF_PREFIX}{digest}")
}

/// UTC minute bucket, `YYYY-MM-DDTHH:MM`.
///
/// Timestamps outside chrono's range map to an empty bucket; they can only
/// come from a broken clock and will simply never match a real bucket.
pub fn minute_bucket(at_ms: u64) -> String {
    i64::try_from(at_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

/// Zero-padded four-digit minute counter.
pub fn format_minutes(minutes: u64) -> String {
    format!("{minutes:04}")
}

/// Constant-time comparison of an expected token against a presented one.
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    constant_time_eq(expected.as_bytes(), presented.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac() -> KeyedMac {
        KeyedMac::new(&[0x11; 32])
    }

    const SALT: &str = "18bcfe568000000000000000001";

    #[test]
    fn setup_token_shape() {
        let token = setup_token(&mac(), SALT, 900);
        let groups: Vec<&str> = token.split('-').collect();

        assert_eq!(groups.len(), 6);
        for group in &groups[..5] {
            assert_eq!(group.len(), 4);
            assert!(group.chars().all(|c| c.is_ascii_hexdigit()));
        }
        assert_eq!(groups[5].len(), 2);
        assert!(groups[5].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn setup_token_binds_salt_and_delay() {
        let base = setup_token(&mac(), SALT, 900);

        assert_eq!(base, setup_token(&mac(), SALT, 900));
        assert_ne!(base, setup_token(&mac(), SALT, 1_800));
        assert_ne!(base, setup_token(&mac(), "18bcfe568000000000000000002", 900));
        assert_ne!(base, setup_token(&KeyedMac::new(&[0x22; 32]), SALT, 900));
    }

    #[test]
    fn temp_proof_has_prefix_and_binds_timestamp() {
        let proof = temp_proof(&mac(), SALT, "15m", 1_700_000_000_000);

        assert!(proof.starts_with(TEMP_PROOF_PREFIX));
        assert_eq!(proof.len(), TEMP_PROOF_PREFIX.len() + 64);
        assert_ne!(proof, temp_proof(&mac(), SALT, "15m", 1_700_000_000_001));
    }

    #[test]
    fn temp_proof_fields_cannot_shift() {
        // Moving a digit between delay and timestamp must change the proof
        let a = temp_proof(&mac(), SALT, "15m", 1_700_000_000_000);
        let b = temp_proof(&mac(), SALT, "15m1", 700_000_000_000);

        assert_ne!(a, b);
    }

    #[test]
    fn fast_copy_proof_is_six_uppercase_hex() {
        let proof = fast_copy_proof(&mac(), "15m", SALT, "0001", "2023-11-14T22:13");

        assert_eq!(proof.len(), FAST_PROOF_LEN);
        assert!(proof.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn fast_copy_proof_binds_bucket() {
        let a = fast_copy_proof(&mac(), "15m", SALT, "0001", "2023-11-14T22:13");
        let b = fast_copy_proof(&mac(), "15m", SALT, "0001", "2023-11-14T22:14");

        assert_ne!(a, b);
    }

    #[test]
    fn window_proof_binds_sealed_secret() {
        let a = window_proof(&mac(), SALT, 1_000, 2_000, "sealedA");
        let b = window_proof(&mac(), SALT, 1_000, 2_000, "sealedB");

        assert!(a.starts_with(WINDOW_PROOF_PREFIX));
        assert_ne!(a, b);
    }

    #[test]
    fn minute_bucket_formats_utc_minutes() {
        // 2023-11-14T22:13:20Z
        assert_eq!(minute_bucket(1_700_000_000_000), "2023-11-14T22:13");
        assert_eq!(minute_bucket(1_700_000_039_999), "2023-11-14T22:13");
        assert_eq!(minute_bucket(1_700_000_040_000), "2023-11-14T22:14");
        assert_eq!(minute_bucket(0), "1970-01-01T00:00");
    }

    #[test]
    fn minutes_are_zero_padded() {
        assert_eq!(format_minutes(0), "0000");
        assert_eq!(format_minutes(1), "0001");
        assert_eq!(format_minutes(12_345), "12345");
    }

    #[test]
    fn tokens_match_is_exact() {
        let proof = temp_proof(&mac(), SALT, "15m", 42);

        assert!(tokens_match(&proof, &proof));
        assert!(!tokens_match(&proof, &proof.to_uppercase()));
        assert!(!tokens_match(&proof, &proof[..proof.len() - 1]));
    }
}
