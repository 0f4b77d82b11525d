//! Fuzz target for sealed secret decoding
//!
//! # Strategy
//!
//! - Random text: arbitrary strings handed straight to `unseal`
//! - Bit flips: a genuine sealed secret with one decoded byte flipped
//! - Truncation: a genuine sealed secret cut at an arbitrary point
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - Only the untouched sealed secret opens, and it opens to its plaintext

#![no_main]

use arbitrary::Arbitrary;
use hourglass_crypto::SealedBox;
use libfuzzer_sys::fuzz_target;

const KEY: [u8; 32] = [0x42; 32];

#[derive(Debug, Clone, Arbitrary)]
enum UnsealAttack {
    RandomText { text: String },
    BitFlip { plaintext: Vec<u8>, nonce: [u8; 24], position: u16, mask: u8 },
    Truncate { plaintext: Vec<u8>, nonce: [u8; 24], keep: u16 },
}

fuzz_target!(|attack: UnsealAttack| {
    let sealer = SealedBox::new(&KEY);

    match attack {
        UnsealAttack::RandomText { text } => {
            let _ = sealer.unseal(&text);
        },
        UnsealAttack::BitFlip { plaintext, nonce, position, mask } => {
            let sealed = sealer.seal(&plaintext, nonce);
            assert_eq!(sealer.unseal(&sealed).ok(), Some(plaintext));

            let mut chars: Vec<char> = sealed.chars().collect();
            let index = usize::from(position) % chars.len();
            let flipped = char::from(chars[index] as u8 ^ (mask | 1));
            if !flipped.is_ascii_alphanumeric() && flipped != '-' && flipped != '_' {
                return;
            }
            chars[index] = flipped;
            let tampered: String = chars.into_iter().collect();

            // The last character may carry unused padding bits that decode
            // to the same bytes.
            if tampered != sealed && index + 1 < sealed.len() {
                assert!(sealer.unseal(&tampered).is_err(), "tampered secret opened");
            }
        },
        UnsealAttack::Truncate { plaintext, nonce, keep } => {
            let sealed = sealer.seal(&plaintext, nonce);
            let keep = usize::from(keep) % sealed.len();
            assert!(sealer.unseal(&sealed[..keep]).is_err(), "truncated secret opened");
        },
    }
});
