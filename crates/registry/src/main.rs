//! `registry`: the SocialAid household registry API.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP).
//! 3. Decode the data encryption key into a [`FieldCipher`].
//! 4. Open the PostgreSQL connection pool.
//! 5. Build the Axum router and serve until SIGINT/SIGTERM.

mod auth;
mod config;
mod crypto;
mod error;
mod models;
mod server;
mod services;
mod store;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use config::Config;
use crypto::{key::generate_key_hex, FieldCipher};
use server::state::AppState;
use store::PgStore;

#[derive(Parser)]
#[command(name = "registry", version)]
#[command(about = "SocialAid household registry API")]
struct Cli {
    /// Print a new hex-encoded data encryption key of LEN bytes (16, 24, or 32) and exit
    #[arg(long, value_name = "LEN", num_args = 0..=1, default_missing_value = "32")]
    generate_key: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(len) = cli.generate_key {
        println!("{}", generate_key_hex(len)?);
        return Ok(());
    }

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %cfg.env,
        port = cfg.port,
        "registry starting"
    );

    // -----------------------------------------------------------------------
    // 3. Field cipher
    // -----------------------------------------------------------------------
    let cipher = FieldCipher::from_hex(&cfg.data_encryption_key)
        .context("failed to load data encryption key")?;

    // -----------------------------------------------------------------------
    // 4. Database
    // -----------------------------------------------------------------------
    let store = PgStore::connect(&cfg.db_dsn, cfg.db_max_open_conns, cfg.db_idle_timeout())
        .await
        .context("failed to connect to database")?;
    info!(
        max_connections = cfg.db_max_open_conns,
        "database connection pool established"
    );

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        Arc::new(store),
        cipher,
        cfg.api_key_header()?,
        cfg.operation_timeout(),
    );
    let router = server::router::build(state, cfg.trusted_origins()?);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("registry stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
