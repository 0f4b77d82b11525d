//! Hourglass server binary.
//!
//! # Usage
//!
//! ```bash
//! # Ephemeral master key (development)
//! hourglass-server --bind 127.0.0.1:7878
//!
//! # Persistent master key shared by every server in a deployment
//! HOURGLASS_MASTER_KEY=$(cat master.hex) hourglass-server --bind 0.0.0.0:7878
//! hourglass-server --master-key-file /etc/hourglass/master.hex
//! ```

use std::path::PathBuf;

use clap::Parser;
use hourglass_server::{DEFAULT_BIND, MAX_LINE_BYTES, Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

/// Hourglass delayed-release server
#[derive(Parser, Debug)]
#[command(name = "hourglass-server")]
#[command(about = "Stateless time-delayed secret release server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = DEFAULT_BIND)]
    bind: String,

    /// Master key as 64 hex characters
    #[arg(long, env = "HOURGLASS_MASTER_KEY", hide_env_values = true)]
    master_key: Option<String>,

    /// Path to a file containing the hex master key
    #[arg(long)]
    master_key_file: Option<PathBuf>,

    /// Secret bound into sha-step and otp-step releases
    #[arg(long, env = "HOURGLASS_RELEASE_SECRET", hide_env_values = true)]
    release_secret: Option<String>,

    /// Maximum request line length in bytes
    #[arg(long, default_value_t = MAX_LINE_BYTES)]
    max_line_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Hourglass server starting");
    tracing::info!("Binding to {}", args.bind);

    let master_key = hourglass_server::resolve_master_key(
        args.master_key.as_deref(),
        args.master_key_file.as_deref(),
    )?;

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        master_key,
        release_secret: args.release_secret.map(|s| Zeroizing::new(s.into_bytes())),
        max_line_bytes: args.max_line_bytes,
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
