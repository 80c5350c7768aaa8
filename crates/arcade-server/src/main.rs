//! Arcade server binary.
//!
//! ```text
//! arcade-server [--host 0.0.0.0] [--port 3000] [--config arcade.json]
//! ```
//!
//! Logging follows `RUST_LOG` and defaults to `info`.

use std::error::Error;
use std::path::{Path, PathBuf};

use arcade::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind to. Overrides the config file.
    #[arg(short = 'H', long)]
    host: Option<String>,
    /// Port to listen on. Overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,
    /// JSON config file. Every field is optional.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    config.bind = bind_address(&config.bind, args.host.as_deref(), args.port);

    let server = ArcadeServerBuilder::new().config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            shutdown.shutdown();
        }
    });
    server.run().await?;
    Ok(())
}

fn load_config(path: &Path) -> Result<ServerConfig, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let config = serde_json::from_str(&text)
        .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Applies `--host` and `--port` on top of the configured `host:port`.
fn bind_address(configured: &str, host: Option<&str>, port: Option<u16>) -> String {
    let (default_host, default_port) = configured.rsplit_once(':').unwrap_or((configured, "3000"));
    let host = host.unwrap_or(default_host);
    match port {
        Some(port) => format!("{host}:{port}"),
        None => format!("{host}:{default_port}"),
    }
}
