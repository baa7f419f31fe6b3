//! Task identifiers.
//!
//! # ULID ベースの TaskId
//! 生成は ULID（時刻でソート可能、128-bit）で行い、外部には UUID 表記で見せる。
//! - **時刻でソート可能**: 生成順に並ぶのでログが追いやすい
//! - **UUID互換**: API の `taskIds` はそのまま UUID としてパースできる
//!
//! submit 時に一度だけ払い出され、実行中も同じ ID が使われ続ける。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;
use uuid::Uuid;

/// Identifier of a Task (one handler run against one target).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(Uuid::from(ulid))
    }

    pub fn as_ulid(&self) -> Ulid {
        Ulid::from(self.0)
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
