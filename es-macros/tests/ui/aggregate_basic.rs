use es_domain::entity::Entity;
use es_macros::aggregate_root;

#[aggregate_root]
#[derive(PartialEq)]
struct Account {
    owner: String,
    balance: i64,
}

#[aggregate_root(debug = false)]
struct Ledger {
    entries: Vec<i64>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ledger({})", self.aggregate_id)
    }
}

fn main() {
    let account = Account::new("acct-1".to_string());
    assert_eq!(account.aggregate_id(), "acct-1");
    assert_eq!(account.aggregate_version(), 0);
    assert!(account.changes().is_empty());
    assert_eq!(account.balance, 0);
    assert!(account.owner.is_empty());

    // 待持久化变更不参与序列化
    let json = serde_json::to_value(&account).unwrap();
    assert!(json.get("changes").is_none());
    assert_eq!(json["aggregate_id"], "acct-1");

    let ledger = Ledger::new("l-1".to_string());
    assert_eq!(format!("{ledger:?}"), "Ledger(l-1)");
    assert!(ledger.entries.is_empty());
}
