//! ldt-web - browsing UI and JSON API over the tracker store
//!
//! Bind address, port and page size come from the command line, then the
//! environment, then the `[web]` section of the config file.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ldt_common::config::{log_directive, TomlConfig};
use ldt_common::db::init::init_database;
use ldt_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for ldt-web
#[derive(Parser, Debug)]
#[command(name = "ldt-web")]
#[command(about = "Lux Democracy Tracker web interface")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "LDT_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "LDT_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(long, env = "LDT_DATABASE")]
    database: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "LDT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_directive(&config).into()),
        )
        .init();

    info!("Starting ldt-web v{}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database_path(args.database.as_deref());
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let bind = args.bind.unwrap_or(config.web.bind_address);
    let port = args.port.unwrap_or(config.web.port);
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;

    let state = AppState::new(pool.clone(), config.web.page_size);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("ldt-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
