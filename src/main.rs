//! Prerender proxy.
//!
//! ```text
//!                       ┌───────────────────────────────────────────────┐
//!                       │                PRERENDER PROXY                 │
//!   Client Request      │  ┌───────────┐   ┌────────────┐               │
//!   ────────────────────┼─▶│ request ID│──▶│ prerender  │── crawler ────┼──▶ Rendering
//!                       │  │ + tracing │   │ classifier │               │    Service
//!                       │  └───────────┘   └─────┬──────┘               │
//!                       │                        │ everyone else        │
//!                       │                        ▼                      │
//!                       │                  ┌────────────┐               │
//!                       │                  │   origin   │───────────────┼──▶ Origin
//!                       │                  │  handler   │               │    Server
//!                       │                  └────────────┘               │
//!                       └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use prerender_proxy::config::{load_config, ProxyConfig};
use prerender_proxy::lifecycle::startup;
use prerender_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "prerender-proxy", version)]
#[command(about = "Serve crawlers from a rendering service, everyone else from the origin")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "PRERENDER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("prerender-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
