use super::handler::HandlerKind;
use super::ids::TaskId;

/// One argument vector waiting in the job queue.
///
/// The task id is assigned at submission and travels with the job, so the
/// worker records status and output under the same id the caller was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub task_id: TaskId,
    pub handler: HandlerKind,
    pub argv: Vec<String>,
}

impl Job {
    pub fn new(task_id: TaskId, handler: HandlerKind, argv: Vec<String>) -> Self {
        Self {
            task_id,
            handler,
            argv,
        }
    }

    /// `argv[0]`, or an empty string for an empty vector.
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}
