//! TaskStore port - タスクレコードの正本（source of truth）
//!
//! # 設計原則
//! - レコードの所有者は store だけ。worker / submission / query は
//!   この trait 越しにしか触らない
//! - 1 つのロックで全レコードの変更と複数フィールドの読み取りを直列化する
//!   （status が変わる途中の output を読まれることはない）
//! - retention / eviction はここでは扱わない

use async_trait::async_trait;

use crate::app::status::StatusCounts;
use crate::domain::{HandlerKind, TaskId, TaskRecord, VolleyError};

/// A state transition applied atomically to one record.
pub type Mutator = Box<dyn FnOnce(&mut TaskRecord) -> Result<(), VolleyError> + Send>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a fresh `queued` record and return its id.
    async fn create(&self, handler: HandlerKind, command: Vec<String>) -> TaskId;

    /// Snapshot of one record.
    async fn get(&self, id: TaskId) -> Option<TaskRecord>;

    /// Apply `mutator` atomically. On error the record is left unchanged.
    /// Returns the committed record.
    async fn update(&self, id: TaskId, mutator: Mutator) -> Result<TaskRecord, VolleyError>;

    async fn counts_by_status(&self) -> StatusCounts;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
