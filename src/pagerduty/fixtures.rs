//! Sample PagerDuty v1 webhook payloads shared by the unit tests.

use serde_json::{json, Value};

use super::{Actor, IncidentEvent, RawEvent};

pub fn alice() -> Actor {
    Actor {
        name: "Alice".to_string(),
        html_url: "https://acme.pagerduty.com/users/PALICE".to_string(),
    }
}

pub fn bob() -> Actor {
    Actor {
        name: "Bob".to_string(),
        html_url: "https://acme.pagerduty.com/users/PBOB".to_string(),
    }
}

fn actor_json(actor: &Actor) -> Value {
    json!({ "name": actor.name, "html_url": actor.html_url })
}

pub fn incident_json(status: &str, assignees: &[Actor]) -> Value {
    json!({
        "id": "PIJ90N7",
        "incident_number": 42,
        "status": status,
        "html_url": "https://acme.pagerduty.com/incidents/PIJ90N7",
        "service": {
            "id": "PBAZLIU",
            "name": "API",
            "html_url": "https://acme.pagerduty.com/services/PBAZLIU"
        },
        "trigger_summary_data": { "subject": "CPU load high on web-1" },
        "assigned_to": assignees
            .iter()
            .map(|a| json!({ "at": "2024-01-01T00:00:00Z", "object": actor_json(a) }))
            .collect::<Vec<_>>()
    })
}

pub fn event_json(event_type: &str, incident: Value) -> Value {
    json!({
        "id": "bb8b8fe0-e8d5-11e2-9c1e-22000afd16cf",
        "type": event_type,
        "created_on": "2024-01-01T00:00:00Z",
        "data": { "incident": incident }
    })
}

pub fn trigger_event() -> Value {
    event_json("incident.trigger", incident_json("triggered", &[alice()]))
}

pub fn assign_event() -> Value {
    event_json("incident.assign", incident_json("triggered", &[alice(), bob()]))
}

pub fn acknowledge_event() -> Value {
    let mut incident = incident_json("acknowledged", &[alice()]);
    incident["acknowledgers"] = json!([
        { "at": "2024-01-01T00:05:00Z", "object": actor_json(&bob()) }
    ]);
    event_json("incident.acknowledge", incident)
}

pub fn resolve_event() -> Value {
    let mut incident = incident_json("resolved", &[alice()]);
    incident["resolved_by_user"] = actor_json(&bob());
    event_json("incident.resolve", incident)
}

/// A well-formed event of any supported type
pub fn event_of_type(event_type: &str) -> Value {
    match event_type {
        "incident.acknowledge" => acknowledge_event(),
        "incident.resolve" => resolve_event(),
        other => event_json(other, incident_json("triggered", &[alice()])),
    }
}

pub fn batch(messages: Vec<Value>) -> Value {
    json!({ "messages": messages })
}

pub fn raw_event(value: Value) -> RawEvent {
    RawEvent::from_value(value).expect("fixture has a type")
}

pub fn parsed(value: Value) -> IncidentEvent {
    IncidentEvent::from_raw(&raw_event(value)).expect("fixture is well formed")
}
