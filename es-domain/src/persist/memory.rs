//! 内存版事件存储与快照存储
//!
//! - `InMemoryEventStore`：每个聚合一个按版本排序的事件流，整批写入在同一把写锁内
//!   完成唯一性校验与追加，失败时不留下任何部分写入；
//! - `InMemorySnapshotStore`：基于 `DashMap`，每个聚合至多一份快照，upsert 为单次原子操作。
//!
//! 典型用途：测试环境、示例与本地开发。

use crate::error::{DomainError, DomainResult as Result};
use crate::persist::{EventRecord, EventStore, Snapshot, SnapshotStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

type Stream = BTreeMap<usize, EventRecord>;

/// 内存事件存储，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<String, Stream>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部聚合的事件总数
    pub async fn len(&self) -> usize {
        self.streams.read().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn save_events(&self, events: &[EventRecord]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self.streams.write().await;

        // 先整体校验，再整体写入
        let mut staged: HashSet<(&str, usize)> = HashSet::with_capacity(events.len());
        for event in events {
            let aggregate_id = event.aggregate_id();
            let version = event.aggregate_version();

            if aggregate_id.is_empty() {
                return Err(DomainError::persistence(
                    "save_events",
                    "aggregate id must not be empty",
                ));
            }
            if version == 0 {
                return Err(DomainError::persistence(
                    "save_events",
                    format!("aggregate version must be >= 1, aggregate_id={aggregate_id}"),
                ));
            }

            let taken = streams
                .get(aggregate_id)
                .is_some_and(|stream| stream.contains_key(&version));
            if taken || !staged.insert((aggregate_id, version)) {
                return Err(DomainError::Conflict {
                    aggregate_id: aggregate_id.to_string(),
                    aggregate_version: version,
                });
            }
        }

        for event in events {
            streams
                .entry(event.aggregate_id().to_string())
                .or_default()
                .insert(event.aggregate_version(), event.clone());
        }

        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        after_version: usize,
    ) -> Result<Vec<EventRecord>> {
        let streams = self.streams.read().await;
        let events = streams
            .get(aggregate_id)
            .map(|stream| {
                stream
                    .range(after_version.saturating_add(1)..)
                    .map(|(_, event)| event.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(events)
    }

    async fn exists(&self, aggregate_id: &str) -> Result<bool> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(aggregate_id)
            .is_some_and(|stream| !stream.is_empty()))
    }
}

/// 内存快照存储，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Arc<DashMap<String, Snapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get_latest_snapshot(&self, aggregate_id: &str) -> Result<Option<Snapshot>> {
        Ok(self
            .snapshots
            .get(aggregate_id)
            .map(|entry| entry.value().clone()))
    }

    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        self.snapshots
            .insert(snapshot.aggregate_id().to_string(), snapshot);
        Ok(())
    }
}
