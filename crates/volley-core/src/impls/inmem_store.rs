//! In-memory task store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::app::status::StatusCounts;
use crate::domain::{HandlerKind, TaskId, TaskRecord, VolleyError};
use crate::ports::{Clock, IdGenerator, Mutator, TaskStore};

/// In-memory task store.
///
/// One `Mutex` guards the whole map: every mutation and every multi-field
/// read happens under it, and no `.await` happens while it is held.
pub struct InMemoryTaskStore {
    records: Mutex<HashMap<TaskId, TaskRecord>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTaskStore {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ids,
            clock,
        }
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, handler: HandlerKind, command: Vec<String>) -> TaskId {
        let id = self.ids.generate_task_id();
        let record = TaskRecord::new(id, handler, command, self.clock.now());

        let mut records = self.records.lock().await;
        records.insert(id, record);
        id
    }

    async fn get(&self, id: TaskId) -> Option<TaskRecord> {
        let records = self.records.lock().await;
        records.get(&id).cloned()
    }

    async fn update(&self, id: TaskId, mutator: Mutator) -> Result<TaskRecord, VolleyError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(&id)
            .ok_or(VolleyError::TaskNotFound(id))?;
        mutator(record)?;
        Ok(record.clone())
    }

    async fn counts_by_status(&self) -> StatusCounts {
        let records = self.records.lock().await;
        records.values().map(|r| r.status).collect()
    }

    async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}
