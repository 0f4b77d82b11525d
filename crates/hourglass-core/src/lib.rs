//! Hourglass protocol core.
//!
//! Stateless delayed-unlock token protocol. A client asks for a secret to
//! become readable only after a delay; the server proves the delay elapsed
//! using MAC-derived tokens instead of stored sessions.
//!
//! # Token chain
//!
//! ```text
//! SetupToken ──► TempBeginProof ──► FastCopyProof ──► UnlockWindowProof ──► secret
//! ```
//!
//! Each stage's output is the next stage's required input. The server
//! re-derives the previous token from public values and its key, so any
//! server holding the same master key can serve any stage.
//!
//! # Components
//!
//! - [`Protocol`]: the state machine operations
//! - [`Environment`]: wall clock and randomness, swappable for simulation
//! - [`ServerKeys`]: master-derived key material
//! - [`ReleaseMode`]: response shaping for released secrets

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod delay;
pub mod env;
pub mod error;
mod keys;
pub mod messages;
mod protocol;
mod release;
pub mod salt;
pub mod tokens;

pub use delay::{
    DEFAULT_DELAYS, DelaySpec, MIN_DELAY_SECS, is_out_of_range, normalize_seconds, parse_seconds,
};
pub use env::Environment;
pub use error::{ProofKind, ProtocolError};
pub use keys::ServerKeys;
pub use messages::{
    FastCopy, SealRequest, Sealed, SetupEntry, SetupRequest, TempBegin, TempBeginRequest,
    TempFastCopyRequest, TempUnlockBeginRequest, UnlockBeginRequest, UnlockFinishRequest,
    UnlockWindow,
};
pub use protocol::{FAST_COPY_BUCKETS, MAX_SETUP_DELAYS, MINUTE_MS, Protocol};
pub use release::{OTP_PERIOD_MS, ReleaseMode, ReleasedSecret};
