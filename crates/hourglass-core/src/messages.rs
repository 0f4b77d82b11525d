//! Operation inputs and outputs.
//!
//! Field names are what clients send and receive (camelCase, proofs under
//! their historical short names). Inputs are plain data; every field is
//! validated by the protocol before use.

use serde::{Deserialize, Serialize};

/// Input to `setup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetupRequest {
    /// Delays to issue tokens for. Absent or empty means the defaults.
    #[serde(default)]
    pub delays: Option<Vec<String>>,
}

/// One issued setup token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetupEntry {
    /// Delay exactly as requested
    pub name: String,
    /// Fresh session salt
    pub salt: String,
    /// Setup token for `(salt, delay)`
    pub proof: String,
}

/// Input to `seal`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SealRequest {
    /// Secret to seal
    pub password: String,
    /// Session salt the secret is bound to
    pub salt: String,
}

/// Output of `seal`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sealed {
    /// Opaque sealed secret
    pub sealed: String,
}

/// Input to `temp_begin`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TempBeginRequest {
    /// Session salt
    pub salt: String,
    /// Delay the setup token was issued for
    pub delay: String,
    /// Setup token
    pub proof: String,
}

/// Output of `temp_begin`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempBegin {
    /// Server time the session began (Unix ms)
    pub create_time: u64,
    /// Proof binding salt and delay to `create_time`
    #[serde(rename = "tempproof")]
    pub temp_proof: String,
}

/// Input to `temp_fast_copy`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempFastCopyRequest {
    /// Delay
    pub delay: String,
    /// Session salt
    pub salt: String,
    /// Creation time returned by `temp_begin`
    pub create_time: u64,
    /// Proof returned by `temp_begin`
    #[serde(rename = "tempproof")]
    pub temp_proof: String,
}

/// Output of `temp_fast_copy`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FastCopy {
    /// Whole minutes since creation, zero-padded to four digits
    pub minutes_elapsed: String,
    /// Six-character proof meant to be typed by hand
    #[serde(rename = "fastproof")]
    pub fast_proof: String,
}

/// Input to `temp_unlock_begin`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempUnlockBeginRequest {
    /// Delay
    pub delay: String,
    /// Session salt
    pub salt: String,
    /// Minute counter returned by `temp_fast_copy`
    pub minutes_elapsed: String,
    /// Proof returned by `temp_fast_copy`
    #[serde(rename = "fastproof")]
    pub fast_proof: String,
    /// Length of the unlock window in minutes
    pub duration_minutes: u64,
    /// Sealed secret the window gates
    pub sealed: String,
}

/// Input to `unlock_begin`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockBeginRequest {
    /// Setup token
    pub proof: String,
    /// Delay
    pub delay: String,
    /// Session salt
    pub salt: String,
    /// Extra minutes added before the window opens
    #[serde(default)]
    pub offset_minutes: u64,
    /// Length of the unlock window in minutes
    pub duration_minutes: u64,
    /// Sealed secret the window gates
    pub sealed: String,
}

/// Output of `temp_unlock_begin` and `unlock_begin`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockWindow {
    /// Window opens (Unix ms)
    pub window_start: u64,
    /// Window closes (Unix ms)
    pub window_end: u64,
    /// Proof binding salt, window and sealed secret
    #[serde(rename = "proof")]
    pub window_proof: String,
}

/// Input to `unlock_finish`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockFinishRequest {
    /// Session salt
    pub salt: String,
    /// Window start returned by unlock begin
    pub window_start: u64,
    /// Window end returned by unlock begin
    pub window_end: u64,
    /// Window proof returned by unlock begin
    pub proof: String,
    /// Sealed secret
    pub sealed: String,
    /// Release mode name (`plain`, `sha-step`, `otp-step`)
    #[serde(default)]
    pub mode: Option<String>,
    /// Second input for `otp-step`
    #[serde(default)]
    pub challenge: Option<String>,
}

/// Plaintext inside a sealed secret.
///
/// Written with short keys; long keys are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct SealedPayload {
    #[serde(rename = "p", alias = "password", alias = "pass")]
    pub(crate) password: String,
    #[serde(rename = "s", alias = "salt")]
    pub(crate) salt: String,
}
