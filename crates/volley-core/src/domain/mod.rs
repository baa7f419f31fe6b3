//! Domain model (IDs, status, records, jobs, handlers, errors).

pub mod errors;
pub mod handler;
pub mod ids;
pub mod job;
pub mod record;
pub mod status;

pub use errors::VolleyError;
pub use handler::{HandlerKind, HandlerSpec, artifact_file_name};
pub use ids::TaskId;
pub use job::Job;
pub use record::{TaskRecord, TaskView};
pub use status::TaskStatus;
