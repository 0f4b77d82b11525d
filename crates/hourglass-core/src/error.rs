//! Error types for the Hourglass protocol core.
//!
//! One variant per validation step, so a caller can tell exactly which
//! check rejected a request. Every failure is reported synchronously and
//! leaves no state behind.

use std::{fmt, time::Duration};

use hourglass_crypto::CryptoError;
use thiserror::Error;

/// Which derived proof failed to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    /// Proof binding salt and delay to a creation instant
    TempBegin,
    /// Short, human-typable proof of minutes elapsed
    FastCopy,
    /// Proof binding salt to an unlock window and sealed secret
    UnlockWindow,
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TempBegin => "temp begin",
            Self::FastCopy => "fast copy",
            Self::UnlockWindow => "unlock window",
        };
        f.write_str(name)
    }
}

/// Errors returned by protocol operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Setup token does not match the presented salt and delay
    #[error("setup token does not match salt and delay")]
    TokenValidation,

    /// A derived proof does not match its re-derivation
    #[error("{proof} proof validation failed")]
    ProofValidation {
        /// Which proof was rejected
        proof: ProofKind,
    },

    /// Finish was called outside the unlock window
    #[error("unlock window not open: {}", window_status(.now, .window_start, .window_end))]
    WindowNotYetOpen {
        /// Server time of the request (Unix ms)
        now: u64,
        /// Window start (Unix ms)
        window_start: u64,
        /// Window end (Unix ms)
        window_end: u64,
    },

    /// Salt embedded in the sealed secret differs from the request salt
    #[error("sealed secret is bound to a different salt")]
    SaltBinding,

    /// Missing or invalid required field
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// What was wrong with the input
        reason: String,
    },

    /// Sealed secret could not be opened or parsed
    #[error("sealed secret rejected: {0}")]
    SealedSecret(#[from] CryptoError),
}

impl ProtocolError {
    /// Shorthand for [`ProtocolError::MalformedInput`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput { reason: reason.into() }
    }

    /// How long to wait before retrying, if waiting can help.
    ///
    /// Only a window that has not opened yet is transient. Every other
    /// failure (including a window that already closed) is permanent for
    /// the presented inputs; the client must restart the relevant stage.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::WindowNotYetOpen { now, window_start, .. } if now < window_start => {
                Some(Duration::from_millis(window_start - now))
            },
            _ => None,
        }
    }

    /// Stable machine-readable name for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenValidation => "token_validation",
            Self::ProofValidation { .. } => "proof_validation",
            Self::WindowNotYetOpen { .. } => "window_not_open",
            Self::SaltBinding => "salt_binding",
            Self::MalformedInput { .. } => "malformed_input",
            Self::SealedSecret(_) => "sealed_secret",
        }
    }
}

fn window_status(now: &u64, window_start: &u64, window_end: &u64) -> String {
    if now < window_start {
        let wait = Duration::from_millis(window_start - now);
        format!("opens in {}s", wait.as_secs().max(1))
    } else {
        let ago = Duration::from_millis(now.saturating_sub(*window_end));
        format!("closed {}s ago", ago.as_secs())
    }
}
