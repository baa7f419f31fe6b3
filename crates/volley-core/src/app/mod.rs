//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: 構築とワイヤリング（起動時検証）
//! - **Engine**: Submission / Query サービス
//! - **WorkerPool**: dequeue → run のループ
//! - **ProcessRunner**: サブプロセスの実行と出力キャプチャ

pub mod builder;
pub mod engine;
pub mod process;
pub mod status;
pub mod worker_pool;

pub use self::builder::{BuildError, EngineBuilder};
pub use self::engine::Engine;
pub use self::process::ProcessRunner;
pub use self::status::{EngineStatus, StatusCounts};
pub use self::worker_pool::WorkerPool;
