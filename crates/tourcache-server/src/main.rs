//! tourcache - HTTP server republishing the TDX tourism feed.
//!
//! Serves spots, foods and events with localized overlay fields, nearby
//! and keyword search, and pinned home listings. All upstream data is
//! cached in memory; see `tourcache_core::cache` for the TTL classes.

mod config;
mod error;
mod routes;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tourcache_core::TourService;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

/// File name prefix for daily-rolling logs
const LOG_FILE_PREFIX: &str = "tourcache.log";

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` controls the level (default `info`). When `log_dir` is set,
/// logs are also written to a daily-rolling file; keep the returned guard
/// alive until exit so buffered lines are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(config.log_dir.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "tourcache starting");

    if !config.credentials().is_complete() {
        warn!("TDX_CLIENT_ID / TDX_CLIENT_SECRET not set, upstream requests will be rejected");
    }

    let service = TourService::new(config.tour_config()).context("Failed to initialize service")?;
    let app = routes::router(Arc::new(service));

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, overlay = %config.overlay_base_url, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("tourcache shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
