//! Server error types.

use std::fmt;

/// Errors that can occur in the server.
///
/// Protocol rejections are not errors at this level; they are answered on
/// the connection and the connection stays open.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, bad master key, etc.).
    ///
    /// These are fatal errors that prevent server startup. Fix configuration
    /// and restart.
    Config(String),

    /// Transport/network error (bind failure, I/O error, etc.).
    ///
    /// May be transient (peer reset) or fatal (bind address in use).
    Transport(String),

    /// Framing error (request line too long).
    ///
    /// Fatal for that connection, but the server keeps serving other
    /// clients.
    Framing(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Framing(msg) => write!(f, "framing error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
