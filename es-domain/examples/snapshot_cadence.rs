/// 快照节奏示例
/// 演示默认每 3 个版本写一次快照，以及加载时仅重放快照之后的事件
use anyhow::Result as AnyResult;
use es_domain::aggregate::AggregateRoot;
use es_domain::aggregate_store::{AggregateEventStore, SnapshotOutcome};
use es_domain::entity::Entity;
use es_domain::eventing::InMemoryEventBus;
use es_domain::persist::{
    InMemoryEventStore, InMemorySnapshotStore, SnapshotPolicy, SnapshotStore,
};
use es_macros::{aggregate_root, domain_event};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[aggregate_root]
struct Thermostat {
    target: i32,
    readings: Vec<i32>,
}

#[domain_event]
enum ThermostatEvent {
    TargetSet { target: i32 },
    Reading { value: i32 },
}

impl AggregateRoot for Thermostat {
    const TYPE: &'static str = "thermostat";
    type Event = ThermostatEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ThermostatEvent::TargetSet { target } => self.target = *target,
            ThermostatEvent::Reading { value } => self.readings.push(*value),
        }
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let events = Arc::new(InMemoryEventStore::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let store = AggregateEventStore::new(
        events.clone(),
        snapshots.clone(),
        Arc::new(InMemoryEventBus::default()),
    );
    info!(policy = %SnapshotPolicy::default(), "snapshot policy");

    let mut thermostat = Thermostat::new("hall".to_string());
    thermostat.raise_event(ThermostatEvent::TargetSet { target: 21 })?;
    store.save(&mut thermostat).await?;

    for value in [19, 20, 21, 22, 21, 20, 19] {
        thermostat.raise_event(ThermostatEvent::Reading { value })?;
        let report = store.save(&mut thermostat).await?;
        if report.snapshot == SnapshotOutcome::Written {
            info!(aggregate_version = report.aggregate_version, "snapshot written");
        }
    }

    let latest = snapshots.get_latest_snapshot("hall").await?;
    let snapshot_version = latest.map(|s| s.aggregate_version()).unwrap_or_default();
    let tail = store.load_events("hall", snapshot_version).await?;
    info!(
        snapshot_version,
        events_total = events.len().await,
        events_to_replay = tail.len(),
        "load plan"
    );

    let loaded: Thermostat = store.load("hall").await?;
    info!(
        aggregate_version = loaded.aggregate_version(),
        target = loaded.target,
        readings = ?loaded.readings,
        "reloaded thermostat"
    );
    Ok(())
}
