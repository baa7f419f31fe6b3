//! InMemoryJobQueue - unbounded FIFO
//!
//! # 学習ポイント
//! - Mutex + Notify による待機付き dequeue
//! - `Notified::enable()` で「確認してから待つ」間の通知取りこぼしを防ぐ
//! - close() 後も残っているジョブは取り出せる（drain してから None）

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::{Job, VolleyError};
use crate::ports::JobQueue;

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    closed: bool,
}

#[derive(Default)]
pub struct InMemoryJobQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // ロック中に await しないので std の Mutex で足りる
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), VolleyError> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(VolleyError::QueueClosed);
            }
            state.jobs.push_back(job);
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn dequeue(&self) -> Option<Job> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(job) = state.jobs.pop_front() {
                    return Some(job);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    async fn depth(&self) -> usize {
        self.lock().jobs.len()
    }
}
