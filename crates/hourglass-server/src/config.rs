//! Runtime configuration and master key loading.

use std::{fmt, path::Path};

use zeroize::Zeroizing;

use crate::error::ServerError;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:7878";

/// Longest request line accepted before the connection is closed.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Server configuration for the production runtime.
#[derive(Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "127.0.0.1:7878")
    pub bind_address: String,
    /// 32-byte master key. `None` generates an ephemeral key at bind time.
    pub master_key: Option<Zeroizing<[u8; 32]>>,
    /// Secret bound into hash-chain release modes. `None` derives one from
    /// the master key.
    pub release_secret: Option<Zeroizing<Vec<u8>>>,
    /// Request line limit in bytes
    pub max_line_bytes: usize,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND.to_string(),
            master_key: None,
            release_secret: None,
            max_line_bytes: MAX_LINE_BYTES,
        }
    }
}

impl fmt::Debug for ServerRuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRuntimeConfig")
            .field("bind_address", &self.bind_address)
            .field("master_key", &self.master_key.as_ref().map(|_| "<redacted>"))
            .field("release_secret", &self.release_secret.as_ref().map(|_| "<redacted>"))
            .field("max_line_bytes", &self.max_line_bytes)
            .finish()
    }
}

/// Parse a master key from 64 hex characters.
///
/// Surrounding whitespace is ignored so keys can be read straight from a
/// file.
pub fn parse_master_key(hex_key: &str) -> Result<Zeroizing<[u8; 32]>, ServerError> {
    let bytes = Zeroizing::new(
        hex::decode(hex_key.trim())
            .map_err(|e| ServerError::Config(format!("master key is not hex: {e}")))?,
    );

    let mut key = Zeroizing::new([0u8; 32]);
    if bytes.len() != key.len() {
        return Err(ServerError::Config(format!(
            "master key must be 32 bytes (64 hex characters), got {} bytes",
            bytes.len()
        )));
    }
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Read a hex master key from a file.
pub fn read_master_key_file(path: &Path) -> Result<Zeroizing<[u8; 32]>, ServerError> {
    let contents = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        ServerError::Config(format!("cannot read master key file {}: {e}", path.display()))
    })?);
    parse_master_key(&contents)
}

/// Pick the master key from at most one configured source.
pub fn resolve_master_key(
    hex_key: Option<&str>,
    key_file: Option<&Path>,
) -> Result<Option<Zeroizing<[u8; 32]>>, ServerError> {
    match (hex_key, key_file) {
        (Some(_), Some(_)) => Err(ServerError::Config(
            "give the master key inline or as a file, not both".to_string(),
        )),
        (Some(hex_key), None) => parse_master_key(hex_key).map(Some),
        (None, Some(path)) => read_master_key_file(path).map(Some),
        (None, None) => Ok(None),
    }
}
