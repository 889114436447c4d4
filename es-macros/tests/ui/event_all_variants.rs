use es_domain::domain_event::DomainEvent;
use es_macros::domain_event;
use serde::{Deserialize, Serialize};

#[domain_event]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum DoorEvent {
    Opened { by: String },
    Locked(String),
    #[event(event_type = "door.closed")]
    Closed,
}

fn main() {
    let events = vec![
        DoorEvent::Opened { by: "alice".into() },
        DoorEvent::Locked("key-7".into()),
        DoorEvent::Closed,
    ];
    let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(types, vec!["DoorEvent.Opened", "DoorEvent.Locked", "door.closed"]);
}
