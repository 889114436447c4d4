//! 领域层统一错误定义
//!
//! 聚焦序列化、持久化（含乐观并发冲突）、事件发布与聚合重建等最小必要集合，
//! 便于各存储/总线实现统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（引擎最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/类型 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    /// 快照或事件记录的类型与期望的聚合/事件种类不一致
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 事件总线 ---
    #[error("event bus error: {reason}")]
    EventBus { reason: String },
    /// 事件已持久化但未能发布，调用方可重试发布或交由外部补偿
    #[error(
        "events persisted but not published: aggregate_id={aggregate_id}, aggregate_version={aggregate_version}, cause={source}"
    )]
    NotPublished {
        aggregate_id: String,
        aggregate_version: usize,
        #[source]
        source: Box<DomainError>,
    },

    // --- 持久化 ---
    #[error("persistence error: operation={operation}, reason={reason}")]
    Persistence {
        operation: &'static str,
        reason: String,
    },
    /// 乐观并发冲突：(aggregate_id, aggregate_version) 已被占用
    #[error("concurrency conflict: aggregate_id={aggregate_id}, aggregate_version={aggregate_version}")]
    Conflict {
        aggregate_id: String,
        aggregate_version: usize,
    },

    // --- 聚合重建 ---
    #[error("aggregate not found: {aggregate_id}")]
    AggregateNotFound { aggregate_id: String },
    #[error("version gap: aggregate_id={aggregate_id}, expected={expected}, found={found}")]
    VersionGap {
        aggregate_id: String,
        expected: usize,
        found: usize,
    },

    // --- 配置 ---
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl DomainError {
    pub fn persistence(operation: &'static str, reason: impl ToString) -> Self {
        DomainError::Persistence {
            operation,
            reason: reason.to_string(),
        }
    }

    pub fn event_bus(reason: impl Into<String>) -> Self {
        DomainError::EventBus {
            reason: reason.into(),
        }
    }

    /// 是否为乐观并发冲突（调用方应重新加载聚合后重试）
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// 允许在基础设施层直接使用 `?` 将 sqlx 错误转换为 DomainError；
// 唯一约束冲突需要聚合标识，由具体存储实现在写入处单独映射为 `Conflict`。
#[cfg(feature = "postgres")]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Persistence {
            operation: "database",
            reason: err.to_string(),
        }
    }
}
