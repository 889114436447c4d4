//! 快照存储协议与策略
//!
//! 定义聚合快照读写接口（单行 upsert 语义）与按版本间隔落盘的快照策略。
//!
use crate::{
    error::{DomainError, DomainResult as Result},
    persist::Snapshot,
};
use async_trait::async_trait;
use std::{fmt, str::FromStr, sync::Arc};

/// 默认快照频率：版本为 3 的倍数时落盘
pub const DEFAULT_SNAPSHOT_FREQUENCY: usize = 3;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 获取该聚合的最新快照；不存在时返回 `None`
    async fn get_latest_snapshot(&self, aggregate_id: &str) -> Result<Option<Snapshot>>;

    /// 原子 upsert：存在则原地覆盖 data/meta_data/version/time_stamp，否则插入
    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()>;
}

#[async_trait]
impl<T> SnapshotStore for Arc<T>
where
    T: SnapshotStore + ?Sized,
{
    async fn get_latest_snapshot(&self, aggregate_id: &str) -> Result<Option<Snapshot>> {
        (**self).get_latest_snapshot(aggregate_id).await
    }

    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        (**self).upsert_snapshot(snapshot).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPolicy {
    Never,
    Every(usize),
}

impl SnapshotPolicy {
    pub fn should_snapshot(&self, version: usize) -> bool {
        match self {
            SnapshotPolicy::Never => false,
            SnapshotPolicy::Every(interval) => {
                let interval = (*interval).max(1);
                version > 0 && version.is_multiple_of(interval)
            }
        }
    }
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        SnapshotPolicy::Every(DEFAULT_SNAPSHOT_FREQUENCY)
    }
}

impl fmt::Display for SnapshotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotPolicy::Never => write!(f, "never"),
            SnapshotPolicy::Every(interval) => write!(f, "every {interval}"),
        }
    }
}

/// 解析快照频率：`0` 或 `never` 表示从不落盘，正整数 `n` 表示每 `n` 个版本落盘一次
impl FromStr for SnapshotPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("never") {
            return Ok(SnapshotPolicy::Never);
        }

        match s.parse::<usize>() {
            Ok(0) => Ok(SnapshotPolicy::Never),
            Ok(interval) => Ok(SnapshotPolicy::Every(interval)),
            Err(err) => Err(DomainError::InvalidConfig {
                reason: format!("invalid snapshot frequency {s:?}: {err}"),
            }),
        }
    }
}
