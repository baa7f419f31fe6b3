//! Impls - ports の in-memory 実装
//!
//! - **InMemoryTaskStore**: タスクレコードの正本
//! - **InMemoryJobQueue**: unbounded FIFO

pub mod inmem_queue;
pub mod inmem_store;

pub use self::inmem_queue::InMemoryJobQueue;
pub use self::inmem_store::InMemoryTaskStore;
