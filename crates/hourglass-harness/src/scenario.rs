//! Scripted protocol runs for tests.
//!
//! Drives a [`Protocol`] over a [`SimEnv`] through the common flows so
//! tests can focus on the step they exercise.

use std::time::Duration;

use hourglass_core::{
    FastCopy, Protocol, ProtocolError, SealRequest, ServerKeys, SetupEntry, SetupRequest,
    TempBegin, TempBeginRequest, TempFastCopyRequest, TempUnlockBeginRequest, UnlockBeginRequest,
    UnlockFinishRequest, UnlockWindow,
};

use crate::sim_env::SimEnv;

/// Master key used by every scenario.
pub const TEST_MASTER_KEY: [u8; 32] = [0x5A; 32];

/// Everything issued during a temp flow, in order.
#[derive(Debug, Clone)]
pub struct TempFlow {
    /// Setup entry for the requested delay
    pub entry: SetupEntry,
    /// Sealed secret bound to the entry's salt
    pub sealed: String,
    /// Output of `temp_begin`
    pub begin: TempBegin,
    /// Output of `temp_fast_copy`
    pub fast: FastCopy,
    /// Output of `temp_unlock_begin`
    pub window: UnlockWindow,
}

/// A protocol instance over a shared simulated environment.
#[derive(Clone)]
pub struct Scenario {
    /// Simulated clock and RNG, shared with `protocol`
    pub env: SimEnv,
    /// Protocol under test
    pub protocol: Protocol<SimEnv>,
}

impl Scenario {
    /// Fresh scenario seeded with `seed`, using [`TEST_MASTER_KEY`].
    pub fn new(seed: u64) -> Self {
        let env = SimEnv::with_seed(seed);
        let protocol = Protocol::new(env.clone(), ServerKeys::from_master(&TEST_MASTER_KEY));
        Self { env, protocol }
    }

    /// Issue a single setup entry for `delay`.
    pub fn setup_one(&self, delay: &str) -> Result<SetupEntry, ProtocolError> {
        let request = SetupRequest { delays: Some(vec![delay.to_string()]) };
        let mut entries = self.protocol.setup(&request)?;
        entries.pop().ok_or_else(|| ProtocolError::malformed("setup returned no entries"))
    }

    /// Seal `password` under `salt`.
    pub fn seal(&self, password: &str, salt: &str) -> Result<String, ProtocolError> {
        let request = SealRequest { password: password.to_string(), salt: salt.to_string() };
        Ok(self.protocol.seal(&request)?.sealed)
    }

    /// Run setup, seal, begin, fast copy (after `wait_before_copy`) and
    /// temp unlock begin.
    pub fn run_temp_flow(
        &self,
        delay: &str,
        wait_before_copy: Duration,
        duration_minutes: u64,
        password: &str,
    ) -> Result<TempFlow, ProtocolError> {
        let entry = self.setup_one(delay)?;
        let sealed = self.seal(password, &entry.salt)?;

        let begin = self.protocol.temp_begin(&TempBeginRequest {
            salt: entry.salt.clone(),
            delay: delay.to_string(),
            proof: entry.proof.clone(),
        })?;

        self.env.advance(wait_before_copy);
        let fast = self.protocol.temp_fast_copy(&TempFastCopyRequest {
            delay: delay.to_string(),
            salt: entry.salt.clone(),
            create_time: begin.create_time,
            temp_proof: begin.temp_proof.clone(),
        })?;

        let window = self.protocol.temp_unlock_begin(&TempUnlockBeginRequest {
            delay: delay.to_string(),
            salt: entry.salt.clone(),
            minutes_elapsed: fast.minutes_elapsed.clone(),
            fast_proof: fast.fast_proof.clone(),
            duration_minutes,
            sealed: sealed.clone(),
        })?;

        Ok(TempFlow { entry, sealed, begin, fast, window })
    }

    /// Run setup, seal and the direct unlock begin.
    pub fn run_direct_flow(
        &self,
        delay: &str,
        offset_minutes: u64,
        duration_minutes: u64,
        password: &str,
    ) -> Result<(SetupEntry, String, UnlockWindow), ProtocolError> {
        let entry = self.setup_one(delay)?;
        let sealed = self.seal(password, &entry.salt)?;

        let window = self.protocol.unlock_begin(&UnlockBeginRequest {
            proof: entry.proof.clone(),
            delay: delay.to_string(),
            salt: entry.salt.clone(),
            offset_minutes,
            duration_minutes,
            sealed: sealed.clone(),
        })?;

        Ok((entry, sealed, window))
    }

    /// Build a plain-mode finish request for a window.
    pub fn finish_request(salt: &str, sealed: &str, window: &UnlockWindow) -> UnlockFinishRequest {
        UnlockFinishRequest {
            salt: salt.to_string(),
            window_start: window.window_start,
            window_end: window.window_end,
            proof: window.window_proof.clone(),
            sealed: sealed.to_string(),
            mode: None,
            challenge: None,
        }
    }
}
