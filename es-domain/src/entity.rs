//! 实体（Entity）基础抽象
//!
//! 为聚合根提供统一的标识、版本与待持久化变更（pending changes）存取能力，
//! 通常由 `#[aggregate_root]` 宏生成实现。
//!
use crate::persist::EventRecord;

/// 具备唯一标识、版本与待持久化变更的实体抽象
pub trait Entity: Send + Sync {
    /// 使用给定标识创建默认实体（版本为 0，无待持久化变更）
    fn new(aggregate_id: String) -> Self;

    /// 获取实体标识
    fn aggregate_id(&self) -> &str;

    /// 获取当前版本（每应用一个事件加一）
    fn aggregate_version(&self) -> usize;

    /// 设置当前版本（仅供事件应用与快照恢复使用）
    fn set_aggregate_version(&mut self, version: usize);

    /// 尚未持久化的事件记录，按应用顺序排列
    fn changes(&self) -> &[EventRecord];

    fn changes_mut(&mut self) -> &mut Vec<EventRecord>;
}
