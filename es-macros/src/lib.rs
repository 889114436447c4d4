mod aggregate_root;
mod domain_event;
mod utils;

use proc_macro::TokenStream;

/// 聚合根宏
/// - 追加字段：`aggregate_id: String`, `aggregate_version: usize`,
///   `changes: Vec<EventRecord>`（若缺失）并置于字段最前
/// - 自动实现 `::es_domain::entity::Entity`（`new/aggregate_id/aggregate_version/changes`）
/// - 支持参数：`#[aggregate_root(debug = false)]` 关闭 `Debug` 派生
#[proc_macro_attribute]
pub fn aggregate_root(attr: TokenStream, item: TokenStream) -> TokenStream {
    aggregate_root::expand(attr, item)
}

/// 领域事件宏
/// - 为枚举合并 serde 等派生并实现 `::es_domain::domain_event::DomainEvent`
/// - 变体可通过 `#[event(event_type = "...")]` 覆写事件类型
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
