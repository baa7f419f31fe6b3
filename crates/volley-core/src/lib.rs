//! volley-core
//!
//! Fans one target out to a fixed set of external command-line scanners,
//! runs each invocation as a subprocess on a fixed-size worker pool, and
//! tracks status and captured output per task.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, TaskStatus, TaskRecord, Job, HandlerSpec, VolleyError）
//! - **ports**: 抽象化レイヤー（TaskStore, JobQueue, Clock, IdGenerator）
//! - **impls**: in-memory 実装
//! - **app**: EngineBuilder, Engine, WorkerPool, ProcessRunner

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{BuildError, Engine, EngineBuilder, EngineStatus, StatusCounts, WorkerPool};
pub use domain::{
    HandlerKind, HandlerSpec, Job, TaskId, TaskRecord, TaskStatus, TaskView, VolleyError,
};
