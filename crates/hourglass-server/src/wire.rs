//! Line-delimited JSON wire format.
//!
//! One request object per line, tagged by `"op"`; one response object per
//! line in the same order.
//!
//! ```text
//! {"op":"temp_begin","salt":"...","delay":"15m","proof":"..."}
//! {"ok":true,"result":{"createTime":1700000000000,"tempproof":"temp_..."}}
//! {"ok":false,"error":{"kind":"window_not_open","message":"...","retryAfterMs":840000}}
//! ```

use hourglass_core::{
    FastCopy, ProtocolError, ReleasedSecret, SealRequest, Sealed, SetupEntry, SetupRequest,
    TempBegin, TempBeginRequest, TempFastCopyRequest, TempUnlockBeginRequest, UnlockBeginRequest,
    UnlockFinishRequest, UnlockWindow,
};
use serde::{Deserialize, Serialize};

/// A client request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Issue setup tokens
    Setup(SetupRequest),
    /// Seal a secret to a salt
    Seal(SealRequest),
    /// Start the temp flow
    TempBegin(TempBeginRequest),
    /// Exchange a temp proof for a fast copy proof
    TempFastCopy(TempFastCopyRequest),
    /// Open a window from a fast copy proof
    TempUnlockBegin(TempUnlockBeginRequest),
    /// Open a window directly from a setup token
    UnlockBegin(UnlockBeginRequest),
    /// Release the secret inside the window
    UnlockFinish(UnlockFinishRequest),
}

impl Request {
    /// Wire name of the operation.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Seal(_) => "seal",
            Self::TempBegin(_) => "temp_begin",
            Self::TempFastCopy(_) => "temp_fast_copy",
            Self::TempUnlockBegin(_) => "temp_unlock_begin",
            Self::UnlockBegin(_) => "unlock_begin",
            Self::UnlockFinish(_) => "unlock_finish",
        }
    }
}

/// Successful operation output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Output of `setup`
    Tokens {
        /// One entry per requested delay
        tokens: Vec<SetupEntry>,
    },
    /// Output of `seal`
    Sealed(Sealed),
    /// Output of `temp_begin`
    TempBegin(TempBegin),
    /// Output of `temp_fast_copy`
    FastCopy(FastCopy),
    /// Output of `temp_unlock_begin` and `unlock_begin`
    Window(UnlockWindow),
    /// Output of `unlock_finish`
    Released(ReleasedSecret),
}

/// Error body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Stable machine-readable error kind
    pub kind: String,
    /// Human-readable description
    pub message: String,
    /// Milliseconds until a retry can succeed, for windows not yet open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl From<&ProtocolError> for ErrorBody {
    fn from(err: &ProtocolError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retry_after_ms: err
                .retry_after()
                .map(|wait| u64::try_from(wait.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// Whether the operation succeeded
    pub ok: bool,
    /// Operation output when `ok`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Reply>,
    /// Failure description when not `ok`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Successful response.
    pub fn success(reply: Reply) -> Self {
        Self { ok: true, result: Some(reply), error: None }
    }

    /// Failed response.
    pub fn failure(err: &ProtocolError) -> Self {
        Self { ok: false, result: None, error: Some(err.into()) }
    }
}
