use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use volley_core::{TaskId, TaskView};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Submission body. `text` is accepted for older clients.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(alias = "text")]
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "taskIds")]
    pub task_ids: Vec<TaskId>,
}

/// POST /receive-data -- fan the target out to every handler.
///
/// Returns as soon as the jobs are queued.
async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> AppResult<Json<SubmitResponse>> {
    let task_ids = state.engine.submit(&body.target).await?;
    tracing::info!(scan_target = %body.target, tasks = task_ids.len(), "Submission accepted");
    Ok(Json(SubmitResponse { task_ids }))
}

/// GET /task-output/{task_id} -- current status and captured output.
async fn task_output(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskView>> {
    let id: TaskId = task_id
        .parse()
        .map_err(|_| AppError::NotFound(format!("task not found: {task_id}")))?;
    let view = state.engine.status(id).await?;
    Ok(Json(view))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/receive-data", post(submit))
        .route("/task-output/{task_id}", get(task_output))
}
