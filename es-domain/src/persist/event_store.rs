//! 事件存储协议（EventStore）
//!
//! 仅追加（append-only）的事件持久化接口，按聚合标识与版本组织事件流。
//!
use crate::{error::DomainResult as Result, persist::EventRecord};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// 以单个工作单元原子追加全部事件：要么全部可见，要么全部不可见。
    ///
    /// 任一 (`aggregate_id`, `aggregate_version`) 已存在（或在同一批次内重复）时
    /// 返回 `DomainError::Conflict`，其余失败返回 `DomainError::Persistence`。
    async fn save_events(&self, events: &[EventRecord]) -> Result<()>;

    /// 加载 `aggregate_version > after_version` 的事件，按版本严格升序；无事件时返回空列表
    async fn load_events(&self, aggregate_id: &str, after_version: usize)
    -> Result<Vec<EventRecord>>;

    /// 是否存在至少一条该聚合的事件
    async fn exists(&self, aggregate_id: &str) -> Result<bool>;
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    async fn save_events(&self, events: &[EventRecord]) -> Result<()> {
        (**self).save_events(events).await
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        after_version: usize,
    ) -> Result<Vec<EventRecord>> {
        (**self).load_events(aggregate_id, after_version).await
    }

    async fn exists(&self, aggregate_id: &str) -> Result<bool> {
        (**self).exists(aggregate_id).await
    }
}
