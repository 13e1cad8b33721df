//! itemsrv binary entry point

use std::sync::Arc;

use anyhow::Result;
use itemsrv::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let config = AppConfig::from_env();
    let state = Arc::new(AppState::new(config));

    match state.db.backend_type() {
        Some(ty) if state.db.is_configured() => {
            tracing::info!("Database backend: {}", ty.label())
        }
        _ => tracing::warn!(
            "Database not configured; item routes will answer 503 until DB_* variables are set"
        ),
    }

    itemsrv::serve(state).await?;
    Ok(())
}
