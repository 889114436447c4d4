//! 事件溯源聚合持久化引擎（es-domain）
//!
//! 负责持久化领域事件、按版本间隔为聚合生成快照，并按需重建聚合：
//! - 聚合根（`aggregate`）与实体（`entity`）建模，事件（`domain_event`）编码；
//! - 事件存储与快照存储协议及实现（`persist`）；
//! - 聚合与快照之间的纯函数转换（`event_sourcing`）；
//! - 已提交事件的下游分发（`eventing`）；
//! - 编排以上组件的 `AggregateEventStore`（`aggregate_store`）。
//!
//! 本 crate 与具体存储、传输解耦：存储通过 `EventStore`/`SnapshotStore` 注入，
//! 总线通过 `EventBus` 注入；内置内存实现（`memory` 特性）与 PostgreSQL 实现（`postgres` 特性）。
//!
//! 典型用法：
//! 1. 使用 `#[aggregate_root]` 与 `#[domain_event]` 定义聚合与事件，实现 `AggregateRoot::apply`；
//! 2. 通过 `raise_event` 在内存中变更聚合；
//! 3. 调用 `AggregateEventStore::save` 持久化、快照并发布事件；
//! 4. 通过 `AggregateEventStore::load` 从快照与增量事件重建聚合。
//!
pub mod aggregate;
pub mod aggregate_store;
pub mod config;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod event_sourcing;
pub mod eventing;
pub mod persist;

// 允许在本 crate 内部通过 ::es_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::es_domain 路径。
extern crate self as es_domain;
