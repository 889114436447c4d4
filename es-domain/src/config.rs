//! 聚合事件存储配置
//!
use crate::error::{DomainError, DomainResult};
use crate::persist::SnapshotPolicy;
use bon::Builder;

/// 快照频率环境变量：`0`/`never` 关闭快照，正整数 `n` 表示每 `n` 个版本落盘一次
pub const SNAPSHOT_FREQUENCY_ENV: &str = "ES_SNAPSHOT_FREQUENCY";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct AggregateStoreConfig {
    #[builder(default)]
    snapshot_policy: SnapshotPolicy,
}

impl AggregateStoreConfig {
    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        self.snapshot_policy
    }

    /// 从环境变量读取配置，未设置的项取默认值
    pub fn from_env() -> DomainResult<Self> {
        match std::env::var(SNAPSHOT_FREQUENCY_ENV) {
            Ok(value) => Self::from_snapshot_frequency(Some(&value)),
            Err(std::env::VarError::NotPresent) => Self::from_snapshot_frequency(None),
            Err(err) => Err(DomainError::InvalidConfig {
                reason: format!("{SNAPSHOT_FREQUENCY_ENV}: {err}"),
            }),
        }
    }

    fn from_snapshot_frequency(value: Option<&str>) -> DomainResult<Self> {
        let snapshot_policy = match value {
            Some(value) => value.parse()?,
            None => SnapshotPolicy::default(),
        };
        Ok(Self { snapshot_policy })
    }
}
