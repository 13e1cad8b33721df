//! itemsrv: multi-backend items REST API server
//!
//! Exposes CRUD over an `items` resource, backed interchangeably by
//! PostgreSQL, MySQL/MariaDB, or MongoDB. The backend family is resolved
//! once at startup from environment configuration; all request handling
//! goes through the [`db::Database`] facade.

pub mod config;
pub mod db;
pub mod dblog;
pub mod http;
pub mod models;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

pub use config::AppConfig;
pub use http::build_router;
pub use state::AppState;

/// Start the HTTP server and run until shutdown.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
