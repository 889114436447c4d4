//! 事件总线（EventBus）协议
//!
//! 将已持久化的事件分发给投影与其他下游消费者。
//!
use crate::{error::DomainResult as Result, persist::EventRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件总线：负责分发已提交的事件
#[async_trait]
pub trait EventBus: Send + Sync {
    /// 按给定顺序发布一批事件；每次保存调用一次，失败不在此重试
    async fn publish(&self, events: &[EventRecord]) -> Result<()>;
}

#[async_trait]
impl<T> EventBus for Arc<T>
where
    T: EventBus + ?Sized,
{
    async fn publish(&self, events: &[EventRecord]) -> Result<()> {
        (**self).publish(events).await
    }
}
