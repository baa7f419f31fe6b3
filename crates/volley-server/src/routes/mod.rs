pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// All task routes (submission + status).
pub fn api_routes() -> Router<AppState> {
    tasks::router()
}
