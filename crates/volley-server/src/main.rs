use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volley_core::EngineBuilder;

use volley_server::config::ServerConfig;
use volley_server::router::build_app;
use volley_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "volley_server=debug,volley_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "volley-server starting");

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid handler configuration");
    let handler_names: Vec<&str> = config.handlers.iter().map(|h| h.kind.name()).collect();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        handlers = ?handler_names,
        "Loaded server configuration"
    );

    // --- Engine + worker pool ---
    let mut builder = EngineBuilder::new().handlers(config.handlers.iter().cloned());
    if let Some(dir) = &config.working_dir {
        builder = builder.working_dir(dir);
    }
    let engine = Arc::new(builder.build().expect("Failed to build engine"));
    let pool = engine.start_workers();

    // --- App state ---
    let state = AppState {
        engine: Arc::clone(&engine),
        config: Arc::new(config.clone()),
    };
    let app = build_app(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining job queue");
    engine.close();

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, pool.join()).await.is_err() {
        // remaining children are killed when their tasks are dropped
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Jobs still running at shutdown"
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
