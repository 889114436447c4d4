use es_domain::domain_event::DomainEvent;
use es_macros::domain_event;

#[domain_event]
enum BankEvent {
    #[event(event_type = "bank.opened")]
    Opened { name: String },
    Renamed { to: String },
}

fn main() {
    let opened = BankEvent::Opened {
        name: "main".into(),
    };
    assert_eq!(opened.event_type(), "bank.opened");

    let renamed = BankEvent::Renamed {
        to: "savings".into(),
    };
    assert_eq!(renamed.event_type(), "BankEvent.Renamed");

    let json = serde_json::to_string(&renamed).unwrap();
    let back: BankEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, renamed);
}
