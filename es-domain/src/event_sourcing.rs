//! 聚合与快照之间的纯函数转换
//!
use crate::{
    aggregate::AggregateRoot,
    error::{DomainError, DomainResult as Result},
    persist::Snapshot,
};
use chrono::Utc;

/// 从聚合实例创建快照（序列化当前字段、版本与时间戳；待持久化变更不进入快照）
pub fn snapshot_from_aggregate<A>(aggregate: &A) -> Result<Snapshot>
where
    A: AggregateRoot,
{
    Ok(Snapshot::builder()
        .aggregate_id(aggregate.aggregate_id().to_string())
        .aggregate_type(A::TYPE.to_string())
        .aggregate_version(aggregate.aggregate_version())
        .data(serde_json::to_vec(aggregate)?)
        .time_stamp(Utc::now())
        .build())
}

/// 将快照反序列化为聚合实例，版本取自快照
pub fn aggregate_from_snapshot<A>(snapshot: &Snapshot) -> Result<A>
where
    A: AggregateRoot,
{
    if A::TYPE != snapshot.aggregate_type() {
        return Err(DomainError::TypeMismatch {
            expected: A::TYPE.to_string(),
            found: snapshot.aggregate_type().to_string(),
        });
    }

    let mut aggregate: A = serde_json::from_slice(snapshot.data())?;
    aggregate.set_aggregate_version(snapshot.aggregate_version());
    aggregate.changes_mut().clear();

    Ok(aggregate)
}
