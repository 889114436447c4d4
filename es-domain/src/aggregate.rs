//! 聚合根（AggregateRoot）抽象
//!
//! 约束一个聚合根的核心行为：
//! - `apply` 将事件投影到状态（只改变业务字段）；
//! - `raise_event` 产生新事件：版本加一、应用事件、追加到待持久化变更；
//! - `replay_event` 重放已持久化事件：应用事件、推进版本，不追加变更；
//! - 通过 `Entity` 约束聚合具备标识、版本与待持久化变更。
//!
use crate::domain_event::{DomainEvent, EventMetadata};
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::persist::EventRecord;
use serde::{Serialize, de::DeserializeOwned};

/// 聚合根接口
pub trait AggregateRoot:
    Entity + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 聚合类型标识，持久化为 `aggregate_type`
    const TYPE: &'static str;

    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;

    /// 应用事件，更新聚合业务状态（版本由调用方维护）
    fn apply(&mut self, event: &Self::Event);

    /// 产生一个新事件（空元数据）
    fn raise_event(&mut self, event: Self::Event) -> DomainResult<()> {
        self.raise_event_with_metadata(event, &EventMetadata::default())
    }

    /// 产生一个新事件并附带因果/关联元数据。
    ///
    /// 先编码事件记录，编码失败时聚合状态保持不变。
    fn raise_event_with_metadata(
        &mut self,
        event: Self::Event,
        metadata: &EventMetadata,
    ) -> DomainResult<()> {
        let version = self.aggregate_version() + 1;
        let record = EventRecord::from_event::<Self>(self.aggregate_id(), version, &event, metadata)?;

        self.apply(&event);
        self.set_aggregate_version(version);
        self.changes_mut().push(record);

        Ok(())
    }

    /// 重放一条已持久化的事件记录，要求聚合类型一致且版本与当前版本连续
    fn replay_event(&mut self, record: &EventRecord) -> DomainResult<()> {
        if record.aggregate_type() != Self::TYPE {
            return Err(DomainError::TypeMismatch {
                expected: Self::TYPE.to_string(),
                found: record.aggregate_type().to_string(),
            });
        }

        let expected = self.aggregate_version() + 1;
        if record.aggregate_version() != expected {
            return Err(DomainError::VersionGap {
                aggregate_id: self.aggregate_id().to_string(),
                expected,
                found: record.aggregate_version(),
            });
        }

        let event: Self::Event = record.decode()?;
        self.apply(&event);
        self.set_aggregate_version(record.aggregate_version());

        Ok(())
    }

    /// 取出并清空待持久化变更
    fn take_changes(&mut self) -> Vec<EventRecord> {
        std::mem::take(self.changes_mut())
    }
}
