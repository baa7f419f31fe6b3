//! Task record: status + captured output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::VolleyError;
use super::handler::HandlerKind;
use super::ids::TaskId;
use super::status::TaskStatus;

/// The single source of truth for one task.
///
/// Design:
/// - Only the task store owns records; everyone else gets clones.
/// - All state transitions go through the methods below, which refuse
///   back-transitions.
/// - `output` only grows. `error` is set iff `status == Failed`.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: TaskId,
    pub handler: HandlerKind,
    pub command: Vec<String>,
    pub status: TaskStatus,
    pub output: String,
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(id: TaskId, handler: HandlerKind, command: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            handler,
            command,
            status: TaskStatus::Queued,
            output: String::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: TaskStatus, now: DateTime<Utc>) -> Result<(), VolleyError> {
        if !self.status.can_transition_to(next) {
            return Err(VolleyError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// The child process has started.
    pub fn mark_running(&mut self, now: DateTime<Utc>) -> Result<(), VolleyError> {
        self.transition(TaskStatus::Running, now)
    }

    /// Append one captured line. The terminator is added here.
    pub fn append_output(&mut self, line: &str, now: DateTime<Utc>) -> Result<(), VolleyError> {
        if self.status != TaskStatus::Running {
            return Err(VolleyError::InvalidTransition {
                from: self.status,
                to: TaskStatus::Running,
            });
        }
        self.output.push_str(line);
        self.output.push('\n');
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> Result<(), VolleyError> {
        self.transition(TaskStatus::Completed, now)
    }

    /// An empty message is replaced so that a failed task always explains itself.
    pub fn mark_failed(
        &mut self,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), VolleyError> {
        self.transition(TaskStatus::Failed, now)?;
        let error = error.into();
        self.error = Some(if error.is_empty() {
            "task failed".to_string()
        } else {
            error
        });
        Ok(())
    }

    pub fn view(&self) -> TaskView {
        TaskView {
            id: self.id,
            status: self.status,
            output: self.output.clone(),
            error: self.error.clone(),
        }
    }
}

/// What the query service hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub status: TaskStatus,
    pub output: String,
    pub error: Option<String>,
}
