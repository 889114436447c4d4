//! 事件子系统（eventing）
//!
//! 定义已提交事件向下游（投影、其他消费者）分发的发布协议 `EventBus`，
//! 以及基于广播通道的内存实现 `InMemoryEventBus`（`memory` 特性）。
//!
pub mod bus;
#[cfg(feature = "memory")]
pub mod bus_inmemory;

pub use bus::EventBus;
#[cfg(feature = "memory")]
pub use bus_inmemory::InMemoryEventBus;
