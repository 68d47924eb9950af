//! Liveness endpoint for the hosting platform.
//!
//! Some deploy targets only keep a process alive if it answers HTTP probes,
//! so the bot exposes a trivial `GET /` alongside the Telegram dispatcher.

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tracing::info;

async fn alive() -> &'static str {
    "Bot is alive!"
}

/// Serve the probe endpoint on `0.0.0.0:port` until the process exits.
pub async fn serve(port: u16) -> Result<()> {
    let app = Router::new().route("/", get(alive));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Starting health check web server");
    axum::serve(listener, app).await?;
    Ok(())
}
