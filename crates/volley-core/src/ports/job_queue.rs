//! JobQueue port - 実行待ちの argument vector を流す FIFO
//!
//! - unbounded（backpressure なし）
//! - 優先度・重複排除なし
//! - 複数 producer / 複数 consumer から安全に使える

use async_trait::async_trait;

use crate::domain::{Job, VolleyError};

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a job. Fails with `QueueClosed` after `close()`.
    async fn enqueue(&self, job: Job) -> Result<(), VolleyError>;

    /// Take the oldest job, waiting until one is available.
    /// Returns `None` once the queue is closed and drained.
    async fn dequeue(&self) -> Option<Job>;

    /// Stop accepting jobs and wake every waiting consumer.
    fn close(&self);

    async fn depth(&self) -> usize;
}
