//! 集成测试共用的账户聚合与计数/可失败测试替身
#![allow(dead_code)]

use async_trait::async_trait;
use es_domain::aggregate::AggregateRoot;
use es_domain::error::{DomainError, DomainResult};
use es_domain::eventing::EventBus;
use es_domain::persist::{
    EventRecord, EventStore, InMemoryEventStore, InMemorySnapshotStore, Snapshot, SnapshotStore,
};
use es_macros::{aggregate_root, domain_event};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[aggregate_root]
#[derive(PartialEq)]
pub struct Account {
    pub owner: String,
    pub balance: i64,
}

#[domain_event]
pub enum AccountEvent {
    Opened { owner: String },
    Deposited { amount: i64 },
    #[event(event_type = "account.withdrawn")]
    Withdrawn { amount: i64 },
}

impl AggregateRoot for Account {
    const TYPE: &'static str = "account";
    type Event = AccountEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened { owner } => self.owner = owner.clone(),
            AccountEvent::Deposited { amount } => self.balance += *amount,
            AccountEvent::Withdrawn { amount } => self.balance -= *amount,
        }
    }
}

/// 记录每次调用的事件存储，可配置为写入失败
#[derive(Default)]
pub struct CountingEventStore {
    inner: InMemoryEventStore,
    saves: Mutex<Vec<Vec<EventRecord>>>,
    loads: Mutex<Vec<(String, usize)>>,
    fail_saves: AtomicBool,
}

impl CountingEventStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_saves.store(true, Ordering::SeqCst);
        store
    }

    pub fn inner(&self) -> &InMemoryEventStore {
        &self.inner
    }

    pub fn saved_batches(&self) -> Vec<Vec<EventRecord>> {
        self.saves.lock().unwrap().clone()
    }

    pub fn load_calls(&self) -> Vec<(String, usize)> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventStore for CountingEventStore {
    async fn save_events(&self, events: &[EventRecord]) -> DomainResult<()> {
        self.saves.lock().unwrap().push(events.to_vec());
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("save_events", "disk full"));
        }
        self.inner.save_events(events).await
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        after_version: usize,
    ) -> DomainResult<Vec<EventRecord>> {
        self.loads
            .lock()
            .unwrap()
            .push((aggregate_id.to_string(), after_version));
        self.inner.load_events(aggregate_id, after_version).await
    }

    async fn exists(&self, aggregate_id: &str) -> DomainResult<bool> {
        self.inner.exists(aggregate_id).await
    }
}

/// 记录快照写入版本的快照存储，可配置为写入失败
#[derive(Default)]
pub struct CountingSnapshotStore {
    inner: InMemorySnapshotStore,
    upserts: Mutex<Vec<usize>>,
    fail_upserts: AtomicBool,
}

impl CountingSnapshotStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_upserts.store(true, Ordering::SeqCst);
        store
    }

    pub fn inner(&self) -> &InMemorySnapshotStore {
        &self.inner
    }

    pub fn upserted_versions(&self) -> Vec<usize> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for CountingSnapshotStore {
    async fn get_latest_snapshot(&self, aggregate_id: &str) -> DomainResult<Option<Snapshot>> {
        self.inner.get_latest_snapshot(aggregate_id).await
    }

    async fn upsert_snapshot(&self, snapshot: Snapshot) -> DomainResult<()> {
        self.upserts
            .lock()
            .unwrap()
            .push(snapshot.aggregate_version());
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("upsert_snapshot", "read-only replica"));
        }
        self.inner.upsert_snapshot(snapshot).await
    }
}

/// 记录每次发布批次的事件总线，可配置为发布失败
#[derive(Default)]
pub struct RecordingBus {
    published: Mutex<Vec<Vec<EventRecord>>>,
    fail: AtomicBool,
}

impl RecordingBus {
    pub fn failing() -> Self {
        let bus = Self::default();
        bus.fail.store(true, Ordering::SeqCst);
        bus
    }

    pub fn published(&self) -> Vec<Vec<EventRecord>> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, events: &[EventRecord]) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::event_bus("broker unavailable"));
        }
        self.published.lock().unwrap().push(events.to_vec());
        Ok(())
    }
}
