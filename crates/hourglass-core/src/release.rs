//! Response shaping for released secrets.
//!
//! Once every proof has validated, the secret can be returned as is or
//! passed through a hash-chain step. Modes only shape the response; they
//! add nothing to the protocol's security.

use hourglass_crypto::{chain_step, double_chain_step};
use serde::Serialize;

use crate::error::ProtocolError;

/// Counter period for [`ReleaseMode::OtpStep`], in milliseconds.
pub const OTP_PERIOD_MS: u64 = 30_000;

/// How an unlocked secret is returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReleaseMode {
    /// Secret returned verbatim
    #[default]
    Plain,
    /// One hash-chain step bound to the server release key
    ShaStep,
    /// Two chained steps over the secret and a caller challenge plus a
    /// time counter
    OtpStep {
        /// Caller-supplied second input
        challenge: String,
    },
}

/// A secret released by `unlock_finish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasedSecret {
    /// Secret, possibly shaped by the release mode
    pub secret: String,
    /// Milliseconds until the unlock window closes
    pub time_left: u64,
    /// Time counter used by `otp-step`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<u64>,
}

impl ReleaseMode {
    /// Resolve a mode from its wire name and optional challenge.
    ///
    /// A missing name means [`ReleaseMode::Plain`].
    pub fn from_wire(mode: Option<&str>, challenge: Option<&str>) -> Result<Self, ProtocolError> {
        match (mode.unwrap_or("plain"), challenge) {
            ("plain", _) => Ok(Self::Plain),
            ("sha-step", _) => Ok(Self::ShaStep),
            ("otp-step", Some(challenge)) if !challenge.is_empty() => {
                Ok(Self::OtpStep { challenge: challenge.to_string() })
            },
            ("otp-step", _) => Err(ProtocolError::malformed("otp-step requires a challenge")),
            (other, _) => Err(ProtocolError::malformed(format!("unknown release mode {other:?}"))),
        }
    }

    /// Wire name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::ShaStep => "sha-step",
            Self::OtpStep { .. } => "otp-step",
        }
    }

    /// Shape `password` for release at `now`, with the window closing at
    /// `window_end`.
    pub fn release(
        &self,
        password: &str,
        window_end: u64,
        now: u64,
        release_key: &[u8],
    ) -> ReleasedSecret {
        let time_left = window_end.saturating_sub(now);
        match self {
            Self::Plain => {
                ReleasedSecret { secret: password.to_string(), time_left, counter: None }
            },
            Self::ShaStep => ReleasedSecret {
                secret: chain_step(password, release_key),
                time_left,
                counter: None,
            },
            Self::OtpStep { challenge } => {
                let counter = now / OTP_PERIOD_MS;
                let second = format!("{challenge}{counter}");
                ReleasedSecret {
                    secret: double_chain_step(password, &second, release_key),
                    time_left,
                    counter: Some(counter),
                }
            },
        }
    }
}
