use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chess_board_core::EngineSession;
use chess_board_web::{config::RelayConfig, router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env();

    // The server still starts without an engine; queries report it as missing
    let engine = match EngineSession::spawn(config.engine.clone()).await {
        Ok(session) => Some(session),
        Err(e) => {
            error!(error = %e, path = %config.engine.path, "Error initializing Stockfish");
            None
        }
    };

    let state = AppState::new(engine);
    let app = router(state.clone());

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.addr, "failed to bind");
            std::process::exit(1);
        }
    };

    info!("Server running on http://{}", config.addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
    }

    // Handlers are gone once serve returns, so the state is ours again
    match Arc::try_unwrap(state) {
        Ok(AppState { engine: Some(engine) }) => engine.shutdown().await,
        Ok(_) => {}
        Err(_) => info!("engine still shared at exit; dropping it"),
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
