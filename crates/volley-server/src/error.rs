use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use volley_core::VolleyError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`VolleyError`] and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] VolleyError),

    /// A resource that does not exist (including unparsable ids).
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) if core.is_client_error() => {
                let code = match core {
                    VolleyError::UnsupportedHandler(_) => "UNSUPPORTED_HANDLER",
                    _ => "INVALID_INPUT",
                };
                (StatusCode::BAD_REQUEST, code, core.to_string())
            }
            AppError::Core(VolleyError::TaskNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("task not found: {id}"),
            ),
            AppError::Core(VolleyError::QueueClosed) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UNAVAILABLE",
                "Server is shutting down".to_string(),
            ),
            AppError::Core(other) => {
                tracing::error!(error = %other, "Internal core error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            status_of(VolleyError::InvalidInput("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(VolleyError::UnsupportedHandler("nmap".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn execution_faults_map_to_500() {
        assert_eq!(
            status_of(VolleyError::ProcessExecution { code: Some(1) }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn closed_queue_maps_to_503() {
        assert_eq!(status_of(VolleyError::QueueClosed), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::NotFound("task not found: x".into())),
            StatusCode::NOT_FOUND
        );
    }
}
