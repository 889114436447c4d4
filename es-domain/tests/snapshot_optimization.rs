#![cfg(feature = "memory")]

mod common;

use anyhow::Result as AnyResult;
use common::{
    Account, AccountEvent, CountingEventStore, CountingSnapshotStore, RecordingBus, init_tracing,
};
use es_domain::aggregate::AggregateRoot;
use es_domain::aggregate_store::AggregateEventStore;
use es_domain::entity::Entity;
use es_domain::error::DomainError;
use es_domain::event_sourcing::snapshot_from_aggregate;
use es_domain::persist::{EventRecord, EventStore, SnapshotStore};
use std::sync::Arc;

/// 构造一个停在给定版本的账户（无待持久化变更）
fn account_at(id: &str, version: usize, balance: i64) -> Account {
    let mut account = Account::new(id.to_string());
    account.owner = "bob".into();
    account.balance = balance;
    account.set_aggregate_version(version);
    account
}

#[tokio::test]
async fn load_reads_only_events_after_snapshot() -> AnyResult<()> {
    init_tracing();
    let events = Arc::new(CountingEventStore::default());
    let snapshots = Arc::new(CountingSnapshotStore::default());
    let store = AggregateEventStore::new(
        events.clone(),
        snapshots.clone(),
        Arc::new(RecordingBus::default()),
    );

    let base = account_at("acct-100", 100, 1_000);
    snapshots
        .inner()
        .upsert_snapshot(snapshot_from_aggregate(&base)?)
        .await?;

    let mut next = base.clone();
    next.raise_event(AccountEvent::Deposited { amount: 1 })?;
    next.raise_event(AccountEvent::Withdrawn { amount: 50 })?;
    events.inner().save_events(&next.take_changes()).await?;

    let loaded: Account = store.load("acct-100").await?;
    assert_eq!(loaded.aggregate_version(), 102);
    assert_eq!(loaded.balance, 951);
    assert_eq!(loaded.owner, "bob");

    assert_eq!(events.load_calls(), vec![("acct-100".to_string(), 100)]);
    Ok(())
}

#[tokio::test]
async fn snapshot_of_another_kind_is_rejected_on_load() -> AnyResult<()> {
    init_tracing();
    let snapshots = Arc::new(CountingSnapshotStore::default());
    let store = AggregateEventStore::new(
        Arc::new(CountingEventStore::default()),
        snapshots.clone(),
        Arc::new(RecordingBus::default()),
    );

    let foreign = es_domain::persist::Snapshot::builder()
        .aggregate_id("acct-x".to_string())
        .aggregate_type("invoice".to_string())
        .aggregate_version(3)
        .data(b"{}".to_vec())
        .build();
    snapshots.inner().upsert_snapshot(foreign).await?;

    let err = store.load::<Account>("acct-x").await.unwrap_err();
    assert!(matches!(err, DomainError::TypeMismatch { .. }));
    Ok(())
}

#[tokio::test]
async fn gap_after_snapshot_fails_replay() -> AnyResult<()> {
    init_tracing();
    let events = Arc::new(CountingEventStore::default());
    let snapshots = Arc::new(CountingSnapshotStore::default());
    let store = AggregateEventStore::new(
        events.clone(),
        snapshots.clone(),
        Arc::new(RecordingBus::default()),
    );

    snapshots
        .inner()
        .upsert_snapshot(snapshot_from_aggregate(&account_at("acct-gap", 3, 0))?)
        .await?;

    let record = EventRecord::from_event::<Account>(
        "acct-gap",
        5,
        &AccountEvent::Deposited { amount: 1 },
        &Default::default(),
    )?;
    events.inner().save_events(&[record]).await?;

    let err = store.load::<Account>("acct-gap").await.unwrap_err();
    match err {
        DomainError::VersionGap {
            expected, found, ..
        } => {
            assert_eq!(expected, 4);
            assert_eq!(found, 5);
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn event_of_another_kind_is_rejected_on_load() -> AnyResult<()> {
    init_tracing();
    let events = Arc::new(CountingEventStore::default());
    let store = AggregateEventStore::new(
        events.clone(),
        Arc::new(CountingSnapshotStore::default()),
        Arc::new(RecordingBus::default()),
    );

    let foreign = EventRecord::builder()
        .aggregate_id("acct-mixed".to_string())
        .aggregate_type("invoice".to_string())
        .aggregate_version(1)
        .event_type("InvoiceEvent.Issued".to_string())
        .data(br#"{"Issued":{"number":7}}"#.to_vec())
        .build();
    events.inner().save_events(&[foreign]).await?;

    let err = store.load::<Account>("acct-mixed").await.unwrap_err();
    match err {
        DomainError::TypeMismatch { expected, found } => {
            assert_eq!(expected, "account");
            assert_eq!(found, "invoice");
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}
