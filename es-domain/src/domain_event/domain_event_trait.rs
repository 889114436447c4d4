use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
///
/// 通常由 `#[domain_event]` 宏生成实现。
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// 事件类型（形如 `AccountEvent.Opened` 或自定义类型名），
    /// 持久化为 `EventRecord::event_type`，重放时用于校验载荷种类
    fn event_type(&self) -> &str;
}
