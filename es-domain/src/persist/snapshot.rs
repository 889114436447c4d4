//! 聚合快照（Snapshot）
//!
//! 聚合在某一版本上的物化状态，每个聚合至多保存一份。
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 聚合在某一版本上的物化状态；每个 `aggregate_id` 至多一份，后写覆盖先写
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct Snapshot {
    aggregate_id: String,
    aggregate_type: String,
    aggregate_version: usize,
    data: Vec<u8>,
    #[builder(default)]
    #[serde(default)]
    meta_data: Vec<u8>,
    #[builder(default = Utc::now())]
    time_stamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
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
}
