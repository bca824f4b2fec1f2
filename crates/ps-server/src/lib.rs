//! ps-server: HTTP server for picstash.
//!
//! This crate ties the ps-* crates into a running server application.
//! It provides:
//!
//! - Axum-based routes for direct links, image pages, comments, and uploads
//! - Token/cookie authentication backed by bcrypt password hashes
//! - Rate limiting on mutating routes plus an action-history audit trail
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use ps_core::config::Config;

use crate::context::AppContext;
use crate::middleware::rate_limit::create_limiter;

/// Start the picstash server.
///
/// This is the main entry point. It validates configuration, initializes the
/// database, loads the placeholder image, constructs the [`AppContext`], and
/// serves HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> ps_core::Result<()> {
    // Validate configuration.
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Initialize database.
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ps_core::Error::Io { source: e })?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = ps_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    // Load the placeholder image. Direct links to missing or removed images
    // serve these bytes, so the server refuses to start without them.
    let placeholder = std::fs::read(&config.server.placeholder_path).map_err(|e| {
        ps_core::Error::Internal(format!(
            "Failed to load placeholder image {}: {e}",
            config.server.placeholder_path.display()
        ))
    })?;
    tracing::info!(
        "Loaded placeholder image from {} ({} bytes)",
        config.server.placeholder_path.display(),
        placeholder.len()
    );

    let limiter = create_limiter(config.rate_limit.mutations_per_minute);

    let ctx = AppContext {
        db,
        config: Arc::new(config.clone()),
        placeholder: Arc::new(placeholder),
        limiter,
    };

    // Build and start the HTTP server.
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ps_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let app = router::build_router(ctx, config.server.static_dir.clone());

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ps_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ps_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
