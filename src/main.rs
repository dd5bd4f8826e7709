//! Redirect gateway.
//!
//! Serves permanent (301) redirects for exact, normalized URL paths in
//! front of a site, with an admin API to manage the rule table one rule
//! at a time or by CSV import.
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────┐
//!     ────────────────────────┼─▶ request id ─▶ resolver ──hit──▶ 301    │
//!                             │                   │                      │
//!                             │                  miss                    │
//!                             │                   ▼                      │
//!     Client Response ◀───────┼──────────── upstream origin / 404        │
//!                             │                                          │
//!     Admin / redirect-cli ───┼─▶ auth ─▶ rules CRUD, CSV import ─▶ store│
//!                             └──────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use redirect_gateway::config::{load_config, GatewayConfig};
use redirect_gateway::http::HttpServer;
use redirect_gateway::lifecycle::{wait_for_signal, Shutdown};
use redirect_gateway::observability::{logging, metrics};
use redirect_gateway::redirects::{RedirectStore, SqliteRedirectStore};

#[derive(Parser)]
#[command(name = "redirect-gateway", version, about = "Path redirect gateway")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "redirect-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_url = %config.site.base_url,
        admin_enabled = config.admin.enabled,
        upstream = ?config.upstream.as_ref().map(|u| &u.address),
        "Configuration loaded"
    );
    if config.admin.enabled && config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
        tracing::warn!("Admin API is using the placeholder API key");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store: Arc<dyn RedirectStore> = Arc::new(SqliteRedirectStore::connect(&config.database).await?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config, store);
    server.run(listener, admin_listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
