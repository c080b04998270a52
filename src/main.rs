//! cpath · Competitive-Programming Practice Path Backend
//!
//! - Axum HTTP + WebSocket API for generating and walking practice paths
//! - Rating-banded, mode-weighted problem selection with a ramped ordering
//! - Optional OpenAI-compatible coach for graded hints (local hints otherwise)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   PATH_CONFIG_PATH  : path to TOML config (generation settings, prompts, problem bank)
//!   OPENAI_API_KEY    : enables the coach if present
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-4o-mini"
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"
//!
//! Log targets: generation, progression, coach, cpath_backend.

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod catalog;
mod generator;
mod progression;
mod store;
mod coach;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Catalog, generator, path store, prompts and the optional coach.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "cpath_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "cpath_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "cpath_backend", error = %e, "Failed to listen for shutdown signal");
  }
  info!(target: "cpath_backend", "Shutdown signal received");
}
