//! Standalone leaderboard server.
//!
//! Configuration comes from `LEADERBOARD_HOST` / `LEADERBOARD_PORT`; logging
//! from `RUST_LOG` (default `info`). Ctrl-C stops it within about a second.
//! With `LEADERBOARD_DUMP=1` the final table is logged as JSON on exit.

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use duotris::leaderboard::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("Cannot listen for Ctrl-C: {}", e);
                // Keep the sender alive; dropping it would stop the server.
                std::future::pending::<()>().await;
            }
        }
    });

    let table = run_server(config, shutdown_rx, None)
        .await
        .with_context(|| format!("leaderboard server on {addr} failed"))?;

    if dump_requested() {
        info!("Final table:\n{}", table.to_json()?);
    }
    info!("Served {} distinct names", table.len());
    Ok(())
}

fn dump_requested() -> bool {
    std::env::var("LEADERBOARD_DUMP")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
