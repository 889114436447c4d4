//! 持久化（persist）
//!
//! 定义事件记录与快照的持久化形态、事件存储与快照存储协议以及快照策略：
//! - 事件仅追加写入，(aggregate_id, aggregate_version) 唯一（`EventStore`）；
//! - 每个聚合至多一份快照，原子 upsert（`SnapshotStore`/`SnapshotPolicy`）；
//! - 内存实现（`memory` 特性）与 PostgreSQL 实现（`postgres` 特性）。
//!
//! 该模块聚焦协议与存储形态，编排逻辑位于 `aggregate_store`。
//!
mod event_record;
mod event_store;
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
mod snapshot;
mod snapshot_store;

pub use event_record::EventRecord;
pub use event_store::EventStore;
#[cfg(feature = "memory")]
pub use memory::{InMemoryEventStore, InMemorySnapshotStore};
pub use snapshot::Snapshot;
pub use snapshot_store::{DEFAULT_SNAPSHOT_FREQUENCY, SnapshotPolicy, SnapshotStore};
