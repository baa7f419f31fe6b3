//! EngineBuilder - エンジンの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - handler が 1 つもない、または同じ handler が二重に登録されていたら
//!   build() が BuildError を返す
//! - clock / id generator / store / queue は差し替え可能（テスト用）。
//!   指定がなければ SystemClock + ULID + in-memory 実装

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use super::engine::Engine;
use super::process::ProcessRunner;
use crate::domain::{HandlerKind, HandlerSpec};
use crate::impls::{InMemoryJobQueue, InMemoryTaskStore};
use crate::ports::{Clock, IdGenerator, JobQueue, SystemClock, TaskStore, UlidGenerator};

/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new()
///     .handler(HandlerSpec::with_default_binary(HandlerKind::PortMap))
///     .handler(HandlerSpec::with_default_binary(HandlerKind::F403))
///     .build()?;
/// let pool = engine.start_workers();
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    handlers: Vec<HandlerSpec>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    store: Option<Arc<dyn TaskStore>>,
    queue: Option<Arc<dyn JobQueue>>,
    working_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no handlers configured")]
    NoHandlers,

    #[error("handler '{0}' is configured more than once")]
    DuplicateHandler(HandlerKind),
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, spec: HandlerSpec) -> Self {
        self.handlers.push(spec);
        self
    }

    pub fn handlers(mut self, specs: impl IntoIterator<Item = HandlerSpec>) -> Self {
        self.handlers.extend(specs);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Ignores `id_generator`: the store is responsible for ids.
    pub fn task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn job_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Working directory of every child process. Relative binaries and
    /// artifact files resolve against it.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<Engine, BuildError> {
        if self.handlers.is_empty() {
            return Err(BuildError::NoHandlers);
        }
        let mut seen = HashSet::new();
        for spec in &self.handlers {
            if !seen.insert(spec.kind) {
                return Err(BuildError::DuplicateHandler(spec.kind));
            }
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = match self.store {
            Some(store) => store,
            None => {
                let ids = self
                    .ids
                    .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())));
                Arc::new(InMemoryTaskStore::new(ids, clock.clone()))
            }
        };
        let queue = self
            .queue
            .unwrap_or_else(|| Arc::new(InMemoryJobQueue::new()));
        let runner = Arc::new(ProcessRunner::new(
            store.clone(),
            clock.clone(),
            self.working_dir,
        ));

        Ok(Engine::new(self.handlers, store, queue, clock, runner))
    }
}
