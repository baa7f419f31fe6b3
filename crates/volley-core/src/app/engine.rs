//! Engine - Submission / Query サービス
//!
//! submit は「コマンド生成 → レコード作成（queued）→ enqueue」だけを行い、
//! 実行の完了は待たない。status は store の最新のコミット済み状態を返す。

use std::sync::Arc;

use super::process::{ProcessRunner, fail_task};
use super::status::EngineStatus;
use super::worker_pool::WorkerPool;
use crate::domain::{HandlerKind, HandlerSpec, Job, TaskId, TaskView, VolleyError};
use crate::ports::{Clock, JobQueue, TaskStore};

pub struct Engine {
    handlers: Vec<HandlerSpec>,
    store: Arc<dyn TaskStore>,
    queue: Arc<dyn JobQueue>,
    clock: Arc<dyn Clock>,
    runner: Arc<ProcessRunner>,
}

impl Engine {
    pub(crate) fn new(
        handlers: Vec<HandlerSpec>,
        store: Arc<dyn TaskStore>,
        queue: Arc<dyn JobQueue>,
        clock: Arc<dyn Clock>,
        runner: Arc<ProcessRunner>,
    ) -> Self {
        Self {
            handlers,
            store,
            queue,
            clock,
            runner,
        }
    }

    pub fn handlers(&self) -> &[HandlerSpec] {
        &self.handlers
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub fn queue(&self) -> &Arc<dyn JobQueue> {
        &self.queue
    }

    /// Start one worker per configured handler.
    pub fn start_workers(&self) -> WorkerPool {
        WorkerPool::spawn(
            self.handlers.len(),
            Arc::clone(&self.queue),
            Arc::clone(&self.runner),
        )
    }

    /// Fan `target` out to every handler. Returns one task id per handler,
    /// in handler order.
    pub async fn submit(&self, target: &str) -> Result<Vec<TaskId>, VolleyError> {
        if target.trim().is_empty() {
            return Err(VolleyError::InvalidInput(
                "target must not be empty".to_string(),
            ));
        }

        // 全コマンドを先に作る（途中で失敗してもレコードが残らないように）
        let now = self.clock.now();
        let commands: Vec<(HandlerKind, Vec<String>)> = self
            .handlers
            .iter()
            .map(|spec| (spec.kind, spec.build_command(target, now)))
            .collect();

        let mut ids = Vec::with_capacity(commands.len());
        for (handler, argv) in commands {
            let id = self.store.create(handler, argv.clone()).await;

            if let Err(err) = self.queue.enqueue(Job::new(id, handler, argv)).await {
                tracing::warn!(task_id = %id, %handler, error = %err, "enqueue failed");
                let marked =
                    fail_task(self.store.as_ref(), self.clock.as_ref(), id, err.to_string()).await;
                if let Err(mark_err) = marked {
                    tracing::warn!(task_id = %id, error = %mark_err, "could not mark task failed");
                }
                return Err(err);
            }

            tracing::info!(task_id = %id, %handler, "task queued");
            ids.push(id);
        }
        Ok(ids)
    }

    /// Current state of one task.
    pub async fn status(&self, id: TaskId) -> Result<TaskView, VolleyError> {
        self.store
            .get(id)
            .await
            .map(|record| record.view())
            .ok_or(VolleyError::TaskNotFound(id))
    }

    pub async fn counts(&self) -> EngineStatus {
        EngineStatus {
            queue_depth: self.queue.depth().await,
            tasks: self.store.counts_by_status().await,
        }
    }

    /// Stop accepting submissions. Workers drain what is already queued.
    pub fn close(&self) {
        self.queue.close();
    }
}
