//! WorkerPool - 固定サイズのワーカー群
//!
//! # フロー（1 ワーカー）
//! 1. JobQueue::dequeue() でジョブを待つ（shutdown と競合させる）
//! 2. ProcessRunner::run() を別 task で実行
//! 3. panic しても JoinError で受け止め、タスクを failed にしてループを続ける
//!
//! 1 ジョブの失敗が他のジョブやワーカーに波及することはない。

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::process::{ProcessRunner, fail_task};
use crate::domain::Job;
use crate::ports::JobQueue;

/// Worker group handle.
/// - `request_shutdown()` で新しいジョブを取らなくなる
/// - `shutdown_and_join()` で全ワーカーの終了を待てる
/// - queue を close した場合は、残りを drain してから各ワーカーが抜ける
pub struct WorkerPool {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `n` workers.
    pub fn spawn(n: usize, queue: Arc<dyn JobQueue>, runner: Arc<ProcessRunner>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let q = Arc::clone(&queue);
            let r = Arc::clone(&runner);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, q, r, &mut rx).await;
            });
            joins.push(join);
        }
        tracing::info!(workers = n, "worker pool started");

        Self { shutdown_tx, joins }
    }

    pub fn size(&self) -> usize {
        self.joins.len()
    }

    /// Request shutdown for all workers.
    /// In-flight jobs run to completion; only new dequeues stop.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        self.join().await;
    }

    /// Wait for all workers without signalling them.
    pub async fn join(self) {
        for j in self.joins {
            if let Err(err) = j.await {
                tracing::error!(error = %err, "worker task ended abnormally");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<dyn JobQueue>,
    runner: Arc<ProcessRunner>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let job = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    // pool handle dropped
                    break;
                }
                continue;
            }
            job = queue.dequeue() => job,
        };

        let Some(job) = job else {
            tracing::debug!(worker_id, "queue closed");
            break;
        };

        run_isolated(worker_id, &runner, job).await;
    }
    tracing::debug!(worker_id, "worker stopped");
}

/// Run one job in its own task so that a panic cannot take the worker down.
async fn run_isolated(worker_id: usize, runner: &Arc<ProcessRunner>, job: Job) {
    let task_id = job.task_id;
    let handle = tokio::spawn({
        let runner = Arc::clone(runner);
        async move { runner.run(&job).await }
    });

    match handle.await {
        Ok(Ok(status)) => {
            tracing::debug!(worker_id, task_id = %task_id, %status, "job finished");
        }
        Ok(Err(err)) => {
            tracing::error!(worker_id, task_id = %task_id, error = %err, "job bookkeeping failed");
        }
        Err(join_err) => {
            tracing::error!(worker_id, task_id = %task_id, error = %join_err, "job panicked");
            let reason = "worker panicked while executing job".to_string();
            if let Err(err) =
                fail_task(runner.store().as_ref(), runner.clock().as_ref(), task_id, reason).await
            {
                tracing::warn!(task_id = %task_id, error = %err, "could not mark task failed");
            }
        }
    }
}
