use std::sync::Arc;

use volley_core::Engine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Submission / query engine. Its worker pool is owned by `main`.
    pub engine: Arc<Engine>,
    pub config: Arc<ServerConfig>,
}
