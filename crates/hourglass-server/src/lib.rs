//! Hourglass production server.
//!
//! Serves the delayed-release protocol as newline-delimited JSON over TCP,
//! using Tokio for the async runtime and system time with cryptographic RNG.
//!
//! # Architecture
//!
//! [`RequestDriver`] follows the Sans-IO pattern: it turns a request line
//! into a response line and nothing else. [`Server`] owns the listener and
//! runs one task per connection, feeding lines to a shared driver. The
//! protocol holds no per-session state, so connections never coordinate.
//!
//! # Components
//!
//! - [`RequestDriver`]: Wire-to-protocol mapping (pure logic, no I/O)
//! - [`Server`]: Production runtime around the driver
//! - [`SystemEnv`]: Production environment (real time, crypto RNG)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod driver;
mod error;
mod system_env;
pub mod wire;

use std::{net::SocketAddr, sync::Arc};

pub use config::{
    DEFAULT_BIND, MAX_LINE_BYTES, ServerRuntimeConfig, parse_master_key, read_master_key_file,
    resolve_master_key,
};
pub use driver::RequestDriver;
pub use error::ServerError;
use hourglass_core::{Environment, Protocol, ServerKeys};
pub use system_env::SystemEnv;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use zeroize::Zeroizing;

/// Production Hourglass server.
///
/// Wraps [`RequestDriver`] with a TCP listener. Generic over the
/// environment so tests can drive a real socket with a simulated clock.
pub struct Server<E: Environment = SystemEnv> {
    /// Shared request driver
    driver: Arc<RequestDriver<E>>,
    /// TCP listener
    listener: TcpListener,
    /// Request line limit
    max_line_bytes: usize,
}

impl Server<SystemEnv> {
    /// Create and bind a new server using the system environment.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        Self::bind_with_env(config, SystemEnv::new()).await
    }
}

impl<E: Environment> Server<E> {
    /// Create and bind a new server over `env`.
    ///
    /// Without a configured master key an ephemeral one is drawn from
    /// `env`; tokens issued by this process then die with it.
    pub async fn bind_with_env(config: ServerRuntimeConfig, env: E) -> Result<Self, ServerError> {
        let master = match config.master_key {
            Some(key) => key,
            None => {
                tracing::warn!("No master key configured - generating an ephemeral key");
                tracing::warn!("Tokens will not validate after a restart or on other servers");
                let mut key = Zeroizing::new([0u8; 32]);
                env.random_bytes(key.as_mut_slice());
                key
            },
        };

        let mut keys = ServerKeys::from_master(&master);
        if let Some(secret) = &config.release_secret {
            keys = keys.with_release_secret(secret);
        }

        let listener = TcpListener::bind(&config.bind_address).await.map_err(|e| {
            ServerError::Transport(format!("cannot bind {}: {e}", config.bind_address))
        })?;

        Ok(Self {
            driver: Arc::new(RequestDriver::new(Protocol::new(env, keys))),
            listener,
            max_line_bytes: config.max_line_bytes,
        })
    }

    /// Run the server, accepting connections and answering requests.
    ///
    /// This method runs until the task is cancelled.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let driver = Arc::clone(&self.driver);
                    let max_line_bytes = self.max_line_bytes;

                    tokio::spawn(async move {
                        tracing::debug!(%peer, "connection accepted");
                        match handle_connection(stream, &driver, max_line_bytes).await {
                            Ok(()) => tracing::debug!(%peer, "connection closed"),
                            Err(e) => tracing::warn!(%peer, "Connection error: {}", e),
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }
}

/// Serve one connection until the peer closes it or sends an oversized
/// line.
async fn handle_connection<E: Environment>(
    stream: TcpStream,
    driver: &RequestDriver<E>,
    max_line_bytes: usize,
) -> Result<(), ServerError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(1024);
    let limit = u64::try_from(max_line_bytes).unwrap_or(u64::MAX).saturating_add(1);

    loop {
        line.clear();
        let read = (&mut reader).take(limit).read_until(b'\n', &mut line).await?;
        if read == 0 {
            return Ok(());
        }
        if line.len() > max_line_bytes && !line.ends_with(b"\n") {
            return Err(ServerError::Framing(format!(
                "request line exceeds {max_line_bytes} bytes"
            )));
        }

        if let Some(mut response) = driver.handle_line(&line) {
            response.push('\n');
            writer.write_all(response.as_bytes()).await?;
            writer.flush().await?;
        }
    }
}
