//! Application builder and server lifecycle.

use std::future::IntoFuture;
use std::time::Duration;

use tokio::sync::watch;

use gateway_converter::ConversionService;
use gateway_core::config::AppConfig;
use gateway_core::error::AppError;
use gateway_core::result::AppResult;

use crate::router::build_router;
use crate::state::AppState;

/// Locate the tool, bind, and serve until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting pandoc-gateway v{}", env!("CARGO_PKG_VERSION"));

    let converter = ConversionService::discover(&config.converter).await?;
    if let Some(tool) = converter.tool_status().tool() {
        tracing::info!(program = %tool.program, version = %tool.version, "Conversion tool ready");
    }

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, converter);
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("pandoc-gateway listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let grace_expired = async move {
        if shutdown_rx.changed().await.is_ok() {
            tracing::info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = grace_expired => {
            tracing::warn!("Shutdown grace period elapsed, abandoning open connections");
        }
    }

    tracing::info!(
        live_resources = state.converter.live_resources(),
        "pandoc-gateway stopped"
    );
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
