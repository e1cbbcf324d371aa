//! mdash-layout - metrics dashboard layout service
//!
//! Serves component layouts, drill-down listings and breadcrumb trails
//! from the `entity_info` / `metric` tables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mdash_common::config::{ConfigOverrides, ServiceConfig};
use mdash_layout::store::SqliteLayoutStore;
use mdash_layout::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for mdash-layout
#[derive(Parser, Debug)]
#[command(name = "mdash-layout")]
#[command(about = "Metrics dashboard layout service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "MDASH_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(short, long, env = "MDASH_DATABASE")]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "MDASH_BIND_ADDR")]
    bind: Option<String>,

    /// Fallback log filter when RUST_LOG is unset
    #[arg(long, env = "MDASH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Maximum breadcrumb trail length
    #[arg(long, env = "MDASH_MAX_BREADCRUMB_DEPTH")]
    max_breadcrumb_depth: Option<usize>,

    /// Fail layout requests on malformed graph layout JSON
    #[arg(long, env = "MDASH_STRICT_GRAPH_LAYOUT")]
    strict_graph_layout: Option<bool>,

    /// Create the database and schema if missing (opens read-write)
    #[arg(long)]
    init_schema: bool,
}

impl From<&Args> for ConfigOverrides {
    fn from(args: &Args) -> Self {
        Self {
            config_file: args.config.clone(),
            database_path: args.database.clone(),
            bind_addr: args.bind.clone(),
            log_level: args.log_level.clone(),
            max_breadcrumb_depth: args.max_breadcrumb_depth,
            strict_graph_layout: args.strict_graph_layout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config =
        ServiceConfig::resolve(ConfigOverrides::from(&args)).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "Starting mdash-layout v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database path: {}", config.database_path.display());

    let pool = if args.init_schema {
        mdash_common::db::init_database(&config.database_path)
            .await
            .context("Failed to initialize database")?
    } else {
        match mdash_layout::db::connect_readonly(&config.database_path).await {
            Ok(pool) => {
                info!("✓ Connected to database (read-only)");
                pool
            }
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                return Err(e);
            }
        }
    };

    let store = Arc::new(SqliteLayoutStore::new(pool));
    let state = AppState::new(store, &config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("mdash-layout listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
