//! 事件持久化模型（EventRecord）
//!
//! 定义事件在持久化层的标准形态，以及与强类型领域事件之间的编解码。
//!
use crate::{
    aggregate::AggregateRoot,
    domain_event::{DomainEvent, EventMetadata},
    error::{DomainError, DomainResult},
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一条不可变的领域事件记录。
///
/// (`aggregate_id`, `aggregate_version`) 在整个事件存储中唯一，
/// 这是检测并发写入冲突的唯一机制。
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct EventRecord {
    /// 聚合 ID，标识事件所属的聚合根实例
    aggregate_id: String,
    /// 聚合类型，用于区分不同的聚合根
    aggregate_type: String,
    /// 聚合版本（从 1 开始），即该事件在聚合历史中的位置
    aggregate_version: usize,
    /// 事件类型，用于反序列化 `data`
    event_type: String,
    /// 事件负载（序列化后的事件体）
    data: Vec<u8>,
    /// 因果/关联上下文，缺省为空
    #[builder(default)]
    #[serde(default)]
    meta_data: Vec<u8>,
    /// 事件创建时间
    #[builder(default = Utc::now())]
    time_stamp: DateTime<Utc>,
}

impl EventRecord {
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn meta_data(&self) -> &[u8] {
        &self.meta_data
    }

    pub fn time_stamp(&self) -> DateTime<Utc> {
        self.time_stamp
    }

    /// 将强类型事件编码为聚合 `A` 在给定版本上的事件记录
    pub fn from_event<A>(
        aggregate_id: &str,
        aggregate_version: usize,
        event: &A::Event,
        metadata: &EventMetadata,
    ) -> DomainResult<Self>
    where
        A: AggregateRoot,
    {
        Ok(Self {
            aggregate_id: aggregate_id.to_string(),
            aggregate_type: A::TYPE.to_string(),
            aggregate_version,
            event_type: event.event_type().to_string(),
            data: serde_json::to_vec(event)?,
            meta_data: metadata.to_bytes()?,
            time_stamp: Utc::now(),
        })
    }

    /// 将 `data` 解码为强类型事件，并校验事件类型与记录一致
    pub fn decode<E>(&self) -> DomainResult<E>
    where
        E: DomainEvent,
    {
        let event: E = serde_json::from_slice(&self.data)?;
        if event.event_type() != self.event_type {
            return Err(DomainError::TypeMismatch {
                expected: self.event_type.clone(),
                found: event.event_type().to_string(),
            });
        }
        Ok(event)
    }

    /// 解码 `meta_data` 中的因果/关联上下文
    pub fn metadata(&self) -> DomainResult<EventMetadata> {
        EventMetadata::from_bytes(&self.meta_data)
    }
}
