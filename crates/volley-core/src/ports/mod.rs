//! Ports - 抽象化レイヤー
//!
//! engine / worker pool はここの trait にだけ依存する。
//! 実装は `impls`（in-memory）にある。

pub mod clock;
pub mod id_generator;
pub mod job_queue;
pub mod task_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::job_queue::JobQueue;
pub use self::task_store::{Mutator, TaskStore};
