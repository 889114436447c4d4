//! 领域事件（Domain Event）与事件元数据
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及随事件一起持久化的
//! 因果/关联上下文 `EventMetadata`。

mod domain_event_trait;
mod metadata;

pub use domain_event_trait::DomainEvent;
pub use metadata::EventMetadata;
