//! Errors - エラー型と分類
//!
//! 同期的に呼び出し元へ返るもの（`InvalidInput`, `UnsupportedHandler`）と、
//! タスクレコードにだけ記録されるもの（launch / exit code / streaming）がある。

use thiserror::Error;

use super::ids::TaskId;
use super::status::TaskStatus;

#[derive(Debug, Error)]
pub enum VolleyError {
    /// Empty or malformed submission target. No task is created.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A handler name with no command-building rule.
    #[error("unsupported handler: {0}")]
    UnsupportedHandler(String),

    #[error("failed to launch '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit status. `None` means the child was terminated by a signal.
    #[error("{}", exit_message(.code))]
    ProcessExecution { code: Option<i32> },

    #[error("error reading process output: {0}")]
    Streaming(#[source] std::io::Error),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("job queue is closed")]
    QueueClosed,
}

fn exit_message(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("process exited with code {code}"),
        None => "process terminated by signal".to_string(),
    }
}

impl VolleyError {
    /// Errors the submitter caused (as opposed to execution or server faults).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VolleyError::InvalidInput(_) | VolleyError::UnsupportedHandler(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_part_of_the_message() {
        let err = VolleyError::ProcessExecution { code: Some(3) };
        assert_eq!(err.to_string(), "process exited with code 3");

        let err = VolleyError::ProcessExecution { code: None };
        assert_eq!(err.to_string(), "process terminated by signal");
    }

    #[test]
    fn launch_error_names_the_program() {
        let err = VolleyError::ProcessLaunch {
            program: "./missing".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to launch './missing'"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn only_submission_errors_are_client_errors() {
        assert!(VolleyError::InvalidInput("empty".into()).is_client_error());
        assert!(VolleyError::UnsupportedHandler("nmap".into()).is_client_error());
        assert!(!VolleyError::QueueClosed.is_client_error());
        assert!(!VolleyError::ProcessExecution { code: Some(1) }.is_client_error());
    }
}
