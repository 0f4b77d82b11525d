//! Fuzz target for proof forgery
//!
//! Feeds arbitrary field values to every protocol stage that validates a
//! client-presented proof. No proof was ever issued, so every stage must
//! reject.
//!
//! # Invariants
//!
//! - NEVER panic, whatever the timestamps, delays or lengths
//! - NEVER accept a full-length proof the server did not issue

#![no_main]

use arbitrary::Arbitrary;
use hourglass_core::{
    Protocol, ServerKeys, TempBeginRequest, TempFastCopyRequest, TempUnlockBeginRequest,
    UnlockBeginRequest, UnlockFinishRequest,
};
use hourglass_harness::{SimEnv, TEST_MASTER_KEY};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Forgery {
    now: u64,
    salt: String,
    delay: String,
    proof: String,
    create_time: u64,
    minutes_elapsed: String,
    offset_minutes: u64,
    duration_minutes: u64,
    window_start: u64,
    window_end: u64,
    sealed: String,
    mode: Option<String>,
    challenge: Option<String>,
}

fuzz_target!(|f: Forgery| {
    let env = SimEnv::starting_at(0, f.now);
    let protocol = Protocol::new(env, ServerKeys::from_master(&TEST_MASTER_KEY));

    assert!(protocol
        .temp_begin(&TempBeginRequest {
            salt: f.salt.clone(),
            delay: f.delay.clone(),
            proof: f.proof.clone(),
        })
        .is_err());

    assert!(protocol
        .temp_fast_copy(&TempFastCopyRequest {
            delay: f.delay.clone(),
            salt: f.salt.clone(),
            create_time: f.create_time,
            temp_proof: f.proof.clone(),
        })
        .is_err());

    // Fast copy proofs are six hex digits and can be guessed; only require
    // that validation terminates cleanly.
    let _ = protocol.temp_unlock_begin(&TempUnlockBeginRequest {
        delay: f.delay.clone(),
        salt: f.salt.clone(),
        minutes_elapsed: f.minutes_elapsed.clone(),
        fast_proof: f.proof.clone(),
        duration_minutes: f.duration_minutes,
        sealed: f.sealed.clone(),
    });

    assert!(protocol
        .unlock_begin(&UnlockBeginRequest {
            proof: f.proof.clone(),
            delay: f.delay.clone(),
            salt: f.salt.clone(),
            offset_minutes: f.offset_minutes,
            duration_minutes: f.duration_minutes,
            sealed: f.sealed.clone(),
        })
        .is_err());

    assert!(protocol
        .unlock_finish(&UnlockFinishRequest {
            salt: f.salt,
            window_start: f.window_start,
            window_end: f.window_end,
            proof: f.proof,
            sealed: f.sealed,
            mode: f.mode,
            challenge: f.challenge,
        })
        .is_err());
});
