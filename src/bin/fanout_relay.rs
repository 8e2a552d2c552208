use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use fanout_bench::relay::{RelayServer, DEFAULT_RELAY_DELAY_MS};
use tokio::signal;

const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<()> {
    fanout_bench::init_tracing();

    let addr_raw = env::var("FANOUT_RELAY_ADDR").unwrap_or_else(|_| DEFAULT_RELAY_ADDR.to_string());
    let addr: SocketAddr = addr_raw
        .trim()
        .parse()
        .with_context(|| format!("failed to parse FANOUT_RELAY_ADDR='{addr_raw}'"))?;
    let delay_ms = match env::var("FANOUT_RELAY_DELAY_MS") {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("failed to parse FANOUT_RELAY_DELAY_MS='{value}'"))?,
        Err(_) => DEFAULT_RELAY_DELAY_MS,
    };

    let server = RelayServer::start(addr, Duration::from_millis(delay_ms)).await?;
    tracing::info!(url = %server.url(), "relay ready; waiting for Ctrl-C (SIGINT) to shut down");

    signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("Ctrl-C received; shutting down relay");
    server.shutdown().await;
    Ok(())
}
