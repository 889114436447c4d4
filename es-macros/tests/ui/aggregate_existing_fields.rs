use es_domain::entity::Entity;
use es_domain::persist::EventRecord;
use es_macros::aggregate_root;

#[aggregate_root]
#[derive(Clone, serde::Serialize)]
struct Order {
    lines: Vec<String>,
    aggregate_version: usize,
    aggregate_id: String,
    changes: Vec<EventRecord>,
}

fn main() {
    let mut order = Order::new("o-1".to_string());
    order.set_aggregate_version(4);
    order.lines.push("book".to_string());

    let copy = order.clone();
    assert_eq!(copy.aggregate_id(), "o-1");
    assert_eq!(copy.aggregate_version(), 4);
    assert_eq!(copy.lines, vec!["book".to_string()]);
}
