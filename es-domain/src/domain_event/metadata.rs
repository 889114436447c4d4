use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;

/// 事件元数据（因果/关联上下文），序列化后存入 `EventRecord::meta_data`
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 关联ID
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    /// 因果ID
    #[serde(skip_serializing_if = "Option::is_none")]
    causation_id: Option<String>,
    /// 触发事件的主体类型（如用户、系统等）
    #[serde(skip_serializing_if = "Option::is_none")]
    actor_type: Option<String>,
    /// 触发事件的主体ID
    #[serde(skip_serializing_if = "Option::is_none")]
    actor_id: Option<String>,
}

impl EventMetadata {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// 编码为字节；空元数据编码为空字节串
    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::to_vec(self)?)
    }

    /// 从字节解码；空字节串解码为默认值
    pub fn from_bytes(bytes: &[u8]) -> DomainResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}
