//! 聚合事件存储（AggregateEventStore）
//!
//! 编排事件存储、快照存储与事件总线，提供 `save`/`load`/`load_events`/`exists`：
//! - 保存：持久化待提交事件 → 按策略写快照 → 发布事件，严格按此顺序；
//! - 加载：最新快照（或默认聚合）+ 快照之后的增量事件重放。
//!
//! 同一聚合的并发写入不做进程内互斥，由事件存储的 (aggregate_id, aggregate_version)
//! 唯一性拒绝后写者（`DomainError::Conflict`），重新加载与重试由调用方负责。
//!
use crate::{
    aggregate::AggregateRoot,
    config::AggregateStoreConfig,
    error::{DomainError, DomainResult as Result},
    event_sourcing::{aggregate_from_snapshot, snapshot_from_aggregate},
    eventing::EventBus,
    persist::{EventRecord, EventStore, SnapshotStore},
};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// 快照步骤的结果；快照失败不会导致保存失败，仅作为诊断信息返回
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// 当前版本不满足快照策略
    Skipped,
    Written,
    Failed { reason: String },
}

/// 一次成功保存的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub aggregate_id: String,
    pub aggregate_version: usize,
    pub events_saved: usize,
    pub snapshot: SnapshotOutcome,
}

pub struct AggregateEventStore<E, S, B> {
    event_store: Arc<E>,
    snapshot_store: Arc<S>,
    event_bus: Arc<B>,
    config: AggregateStoreConfig,
}

impl<E, S, B> AggregateEventStore<E, S, B>
where
    E: EventStore,
    S: SnapshotStore,
    B: EventBus,
{
    pub fn new(event_store: Arc<E>, snapshot_store: Arc<S>, event_bus: Arc<B>) -> Self {
        Self::with_config(
            event_store,
            snapshot_store,
            event_bus,
            AggregateStoreConfig::default(),
        )
    }

    pub fn with_config(
        event_store: Arc<E>,
        snapshot_store: Arc<S>,
        event_bus: Arc<B>,
        config: AggregateStoreConfig,
    ) -> Self {
        Self {
            event_store,
            snapshot_store,
            event_bus,
            config,
        }
    }

    pub fn config(&self) -> &AggregateStoreConfig {
        &self.config
    }

    /// 保存聚合的待提交事件：
    /// 1. 复制待提交事件（后续步骤均基于该副本）；
    /// 2. 原子持久化，失败则中止（不写快照、不发布）；成功后清空聚合的待提交事件；
    /// 3. 版本满足快照策略时写快照，失败仅记录并体现在 `SaveReport::snapshot`；
    /// 4. 发布事件副本，失败返回 `DomainError::NotPublished`（事件已持久化，原始总线错误作为 `source`）。
    #[instrument(
        skip_all,
        fields(aggregate_id = %aggregate.aggregate_id(), aggregate_type = A::TYPE)
    )]
    pub async fn save<A>(&self, aggregate: &mut A) -> Result<SaveReport>
    where
        A: AggregateRoot,
    {
        let changes: Vec<EventRecord> = aggregate.changes().to_vec();
        let aggregate_id = aggregate.aggregate_id().to_string();
        let aggregate_version = aggregate.aggregate_version();

        if changes.is_empty() {
            debug!(aggregate_version, "no pending changes, nothing to save");
            return Ok(SaveReport {
                aggregate_id,
                aggregate_version,
                events_saved: 0,
                snapshot: SnapshotOutcome::Skipped,
            });
        }

        if let Err(err) = self.event_store.save_events(&changes).await {
            error!(
                aggregate_version,
                operation = "save_events",
                count = changes.len(),
                error = %err,
                "failed to save events"
            );
            return Err(err);
        }
        aggregate.changes_mut().clear();
        debug!(aggregate_version, count = changes.len(), "saved events");

        let snapshot = self.save_snapshot(aggregate).await;

        if let Err(err) = self.event_bus.publish(&changes).await {
            error!(
                aggregate_version,
                operation = "publish",
                count = changes.len(),
                error = %err,
                "events persisted but publishing failed"
            );
            return Err(DomainError::NotPublished {
                aggregate_id,
                aggregate_version,
                source: Box::new(err),
            });
        }
        debug!(aggregate_version, count = changes.len(), "published events");

        Ok(SaveReport {
            aggregate_id,
            aggregate_version,
            events_saved: changes.len(),
            snapshot,
        })
    }

    async fn save_snapshot<A>(&self, aggregate: &A) -> SnapshotOutcome
    where
        A: AggregateRoot,
    {
        let aggregate_version = aggregate.aggregate_version();
        let policy = self.config.snapshot_policy();

        if !policy.should_snapshot(aggregate_version) {
            debug!(aggregate_version, %policy, "snapshot not due");
            return SnapshotOutcome::Skipped;
        }

        let result = match snapshot_from_aggregate(aggregate) {
            Ok(snapshot) => self.snapshot_store.upsert_snapshot(snapshot).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                debug!(aggregate_version, "snapshot saved");
                SnapshotOutcome::Written
            }
            Err(err) => {
                warn!(
                    aggregate_version,
                    operation = "upsert_snapshot",
                    error = %err,
                    "failed to save snapshot, events are persisted"
                );
                SnapshotOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// 加载聚合：最新快照（无则默认聚合，版本 0）+ 之后的事件重放。
    ///
    /// 既无快照也无事件时返回 `DomainError::AggregateNotFound`。
    #[instrument(skip(self), fields(aggregate_type = A::TYPE))]
    pub async fn load<A>(&self, aggregate_id: &str) -> Result<A>
    where
        A: AggregateRoot,
    {
        let snapshot = self
            .snapshot_store
            .get_latest_snapshot(aggregate_id)
            .await
            .inspect_err(|err| {
                error!(
                    operation = "get_latest_snapshot",
                    error = %err,
                    "failed to load snapshot"
                )
            })?;

        let mut aggregate = match snapshot {
            Some(snapshot) => {
                debug!(
                    aggregate_version = snapshot.aggregate_version(),
                    "restoring from snapshot"
                );
                aggregate_from_snapshot::<A>(&snapshot)?
            }
            None => {
                debug!("no snapshot found");
                A::new(aggregate_id.to_string())
            }
        };

        let events = self
            .load_events(aggregate_id, aggregate.aggregate_version())
            .await?;

        if events.is_empty() {
            if aggregate.aggregate_version() == 0 {
                return Err(DomainError::AggregateNotFound {
                    aggregate_id: aggregate_id.to_string(),
                });
            }
            return Ok(aggregate);
        }

        for record in &events {
            aggregate.replay_event(record).inspect_err(|err| {
                error!(
                    aggregate_version = record.aggregate_version(),
                    operation = "replay_event",
                    error = %err,
                    "failed to replay event"
                )
            })?;
        }
        debug!(
            aggregate_version = aggregate.aggregate_version(),
            replayed = events.len(),
            "aggregate loaded"
        );

        Ok(aggregate)
    }

    pub async fn load_events(
        &self,
        aggregate_id: &str,
        after_version: usize,
    ) -> Result<Vec<EventRecord>> {
        self.event_store
            .load_events(aggregate_id, after_version)
            .await
            .inspect_err(|err| {
                error!(
                    aggregate_id,
                    after_version,
                    operation = "load_events",
                    error = %err,
                    "failed to load events"
                )
            })
    }

    pub async fn exists(&self, aggregate_id: &str) -> Result<bool> {
        self.event_store
            .exists(aggregate_id)
            .await
            .inspect_err(|err| {
                error!(
                    aggregate_id,
                    operation = "exists",
                    error = %err,
                    "failed to check aggregate existence"
                )
            })
    }
}
