//! PostgreSQL 事件存储与快照存储（`postgres` 特性）
//!
//! - `events` 表以 (aggregate_id, aggregate_version) 为主键，主键冲突映射为 `DomainError::Conflict`；
//! - 整批事件在同一事务内写入，任一失败则整体回滚；
//! - `snapshots` 表以 aggregate_id 为主键，upsert 使用 `ON CONFLICT ... DO UPDATE` 单语句完成。
//!
use crate::error::{DomainError, DomainResult as Result};
use crate::persist::{EventRecord, EventStore, Snapshot, SnapshotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// 存储所需的表结构
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    aggregate_id      TEXT        NOT NULL CHECK (aggregate_id <> ''),
    aggregate_type    TEXT        NOT NULL,
    aggregate_version BIGINT      NOT NULL CHECK (aggregate_version >= 1),
    event_type        TEXT        NOT NULL,
    data              BYTEA       NOT NULL,
    meta_data         BYTEA       NOT NULL DEFAULT ''::bytea,
    time_stamp        TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (aggregate_id, aggregate_version)
);

CREATE TABLE IF NOT EXISTS snapshots (
    aggregate_id      TEXT        PRIMARY KEY,
    aggregate_type    TEXT        NOT NULL,
    aggregate_version BIGINT      NOT NULL,
    data              BYTEA       NOT NULL,
    meta_data         BYTEA       NOT NULL DEFAULT ''::bytea,
    time_stamp        TIMESTAMPTZ NOT NULL
);
"#;

/// 创建存储所需的表（幂等）
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

fn to_db_version(operation: &'static str, version: usize) -> Result<i64> {
    i64::try_from(version).map_err(|err| DomainError::persistence(operation, err))
}

fn from_db_version(operation: &'static str, version: i64) -> Result<usize> {
    usize::try_from(version).map_err(|err| DomainError::persistence(operation, err))
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    aggregate_id: String,
    aggregate_type: String,
    aggregate_version: i64,
    event_type: String,
    data: Vec<u8>,
    meta_data: Vec<u8>,
    time_stamp: DateTime<Utc>,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(EventRecord::builder()
            .aggregate_version(from_db_version("load_events", row.aggregate_version)?)
            .aggregate_id(row.aggregate_id)
            .aggregate_type(row.aggregate_type)
            .event_type(row.event_type)
            .data(row.data)
            .meta_data(row.meta_data)
            .time_stamp(row.time_stamp)
            .build())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    aggregate_id: String,
    aggregate_type: String,
    aggregate_version: i64,
    data: Vec<u8>,
    meta_data: Vec<u8>,
    time_stamp: DateTime<Utc>,
}

impl TryFrom<SnapshotRow> for Snapshot {
    type Error = DomainError;

    fn try_from(row: SnapshotRow) -> Result<Self> {
        Ok(Snapshot::builder()
            .aggregate_version(from_db_version(
                "get_latest_snapshot",
                row.aggregate_version,
            )?)
            .aggregate_id(row.aggregate_id)
            .aggregate_type(row.aggregate_type)
            .data(row.data)
            .meta_data(row.meta_data)
            .time_stamp(row.time_stamp)
            .build())
    }
}

#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn save_events(&self, events: &[EventRecord]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for event in events {
            sqlx::query(
                "INSERT INTO events (
                    aggregate_id, aggregate_type, aggregate_version, event_type,
                    data, meta_data, time_stamp
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(event.aggregate_id())
            .bind(event.aggregate_type())
            .bind(to_db_version("save_events", event.aggregate_version())?)
            .bind(event.event_type())
            .bind(event.data())
            .bind(event.meta_data())
            .bind(event.time_stamp())
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                let unique_violation = err
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if unique_violation {
                    DomainError::Conflict {
                        aggregate_id: event.aggregate_id().to_string(),
                        aggregate_version: event.aggregate_version(),
                    }
                } else {
                    DomainError::persistence("save_events", err)
                }
            })?;
        }

        // 提前返回时事务随 drop 回滚
        tx.commit()
            .await
            .map_err(|err| DomainError::persistence("save_events", err))?;

        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        after_version: usize,
    ) -> Result<Vec<EventRecord>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT aggregate_id, aggregate_type, aggregate_version, event_type,
                    data, meta_data, time_stamp
               FROM events
              WHERE aggregate_id = $1 AND aggregate_version > $2
              ORDER BY aggregate_version ASC",
        )
        .bind(aggregate_id)
        .bind(to_db_version("load_events", after_version)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::persistence("load_events", err))?;

        rows.into_iter().map(EventRecord::try_from).collect()
    }

    async fn exists(&self, aggregate_id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM events WHERE aggregate_id = $1)",
        )
        .bind(aggregate_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| DomainError::persistence("exists", err))?;

        Ok(exists)
    }
}

#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn get_latest_snapshot(&self, aggregate_id: &str) -> Result<Option<Snapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT aggregate_id, aggregate_type, aggregate_version, data, meta_data, time_stamp
               FROM snapshots
              WHERE aggregate_id = $1
              ORDER BY aggregate_version DESC
              LIMIT 1",
        )
        .bind(aggregate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DomainError::persistence("get_latest_snapshot", err))?;

        row.map(Snapshot::try_from).transpose()
    }

    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        sqlx::query(
            "INSERT INTO snapshots (
                aggregate_id, aggregate_type, aggregate_version, data, meta_data, time_stamp
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (aggregate_id) DO UPDATE SET
                aggregate_type = EXCLUDED.aggregate_type,
                aggregate_version = EXCLUDED.aggregate_version,
                data = EXCLUDED.data,
                meta_data = EXCLUDED.meta_data,
                time_stamp = EXCLUDED.time_stamp",
        )
        .bind(snapshot.aggregate_id())
        .bind(snapshot.aggregate_type())
        .bind(to_db_version("upsert_snapshot", snapshot.aggregate_version())?)
        .bind(snapshot.data())
        .bind(snapshot.meta_data())
        .bind(snapshot.time_stamp())
        .execute(&self.pool)
        .await
        .map_err(|err| DomainError::persistence("upsert_snapshot", err))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_row_version_is_rejected() {
        let row = EventRow {
            aggregate_id: "acct-1".into(),
            aggregate_type: "account".into(),
            aggregate_version: -1,
            event_type: "AccountEvent.Opened".into(),
            data: b"{}".to_vec(),
            meta_data: Vec::new(),
            time_stamp: Utc::now(),
        };

        let err = EventRecord::try_from(row).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Persistence {
                operation: "load_events",
                ..
            }
        ));
    }

    #[test]
    fn snapshot_row_maps_every_column() {
        let now = Utc::now();
        let row = SnapshotRow {
            aggregate_id: "acct-1".into(),
            aggregate_type: "account".into(),
            aggregate_version: 6,
            data: b"{\"balance\":10}".to_vec(),
            meta_data: Vec::new(),
            time_stamp: now,
        };

        let snapshot = Snapshot::try_from(row).unwrap();
        assert_eq!(snapshot.aggregate_id(), "acct-1");
        assert_eq!(snapshot.aggregate_version(), 6);
        assert_eq!(snapshot.time_stamp(), now);
    }

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    fn event(aggregate_id: &str, version: usize) -> EventRecord {
        EventRecord::builder()
            .aggregate_id(aggregate_id.to_string())
            .aggregate_type("account".to_string())
            .aggregate_version(version)
            .event_type("AccountEvent.Deposited".to_string())
            .data(br#"{"Deposited":{"amount":1}}"#.to_vec())
            .build()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_version_is_conflict_and_batch_rolls_back() {
        let store = PgEventStore::new(test_pool().await);
        let id = ulid::Ulid::new().to_string();

        store
            .save_events(&[event(&id, 1), event(&id, 2)])
            .await
            .unwrap();

        let err = store
            .save_events(&[event(&id, 3), event(&id, 2)])
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict {
                aggregate_id,
                aggregate_version,
            } => {
                assert_eq!(aggregate_id, id);
                assert_eq!(aggregate_version, 2);
            }
            other => panic!("unexpected {other:?}"),
        }

        let versions: Vec<usize> = store
            .load_events(&id, 0)
            .await
            .unwrap()
            .iter()
            .map(EventRecord::aggregate_version)
            .collect();
        assert_eq!(versions, vec![1, 2]);
        assert!(store.exists(&id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn snapshot_upsert_keeps_one_row() {
        let pool = test_pool().await;
        let store = PgSnapshotStore::new(pool.clone());
        let id = ulid::Ulid::new().to_string();

        for version in [3, 6] {
            let snapshot = Snapshot::builder()
                .aggregate_id(id.clone())
                .aggregate_type("account".to_string())
                .aggregate_version(version)
                .data(format!(r#"{{"balance":{version}}}"#).into_bytes())
                .build();
            store.upsert_snapshot(snapshot).await.unwrap();
        }

        let rows = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM snapshots WHERE aggregate_id = $1",
        )
        .bind(&id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);

        let latest = store.get_latest_snapshot(&id).await.unwrap().unwrap();
        assert_eq!(latest.aggregate_version(), 6);
        assert_eq!(latest.data(), br#"{"balance":6}"#);
    }
}
