use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{RelayError, Result};

/// The closed set of PagerDuty v1 webhook event types we relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Trigger,
    Acknowledge,
    Unacknowledge,
    Resolve,
    Assign,
    Escalate,
    Delegate,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Trigger,
        EventType::Acknowledge,
        EventType::Unacknowledge,
        EventType::Resolve,
        EventType::Assign,
        EventType::Escalate,
        EventType::Delegate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Trigger => "incident.trigger",
            EventType::Acknowledge => "incident.acknowledge",
            EventType::Unacknowledge => "incident.unacknowledge",
            EventType::Resolve => "incident.resolve",
            EventType::Assign => "incident.assign",
            EventType::Escalate => "incident.escalate",
            EventType::Delegate => "incident.delegate",
        }
    }
}

impl FromStr for EventType {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        EventType::ALL
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| RelayError::UnsupportedEventType(s.to_string()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PagerDuty user, shown as a markdown link to their profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Actor {
    pub name: String,
    pub html_url: String,
}

impl Actor {
    pub fn link(&self) -> String {
        format!("[{}]({})", self.name, self.html_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Service {
    pub name: String,
    pub html_url: String,
}

/// Fields every incident event carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub status: String,
    pub html_url: String,
    pub service: Service,
    pub incident_number: u64,
    pub subject: String,
    pub assignees: Vec<Actor>,
}

/// Type-specific part of an event. Only the variants that interpolate
/// an actor into their details carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Trigger,
    Acknowledge { acknowledgers: Vec<Actor> },
    Unacknowledge,
    Resolve { resolver: Actor },
    Assign,
    Escalate,
    Delegate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentEvent {
    pub incident: Incident,
    pub kind: EventKind,
}

impl IncidentEvent {
    pub fn event_type(&self) -> EventType {
        match self.kind {
            EventKind::Trigger => EventType::Trigger,
            EventKind::Acknowledge { .. } => EventType::Acknowledge,
            EventKind::Unacknowledge => EventType::Unacknowledge,
            EventKind::Resolve { .. } => EventType::Resolve,
            EventKind::Assign => EventType::Assign,
            EventKind::Escalate => EventType::Escalate,
            EventKind::Delegate => EventType::Delegate,
        }
    }

    /// Checks the type against the supported set, then decodes the
    /// incident with the fields that type requires.
    pub fn from_raw(raw: &RawEvent) -> Result<Self> {
        let event_type: EventType = raw.event_type.parse()?;

        let data = WireData::deserialize(&raw.data)
            .map_err(|e| RelayError::malformed_event(&raw.event_type, e))?;
        let WireIncident {
            status,
            html_url,
            service,
            incident_number,
            trigger_summary_data,
            assigned_to,
            acknowledgers,
            resolved_by_user,
        } = data.incident;

        let kind = match event_type {
            EventType::Trigger => EventKind::Trigger,
            EventType::Acknowledge => {
                let acknowledgers = acknowledgers.ok_or_else(|| {
                    RelayError::malformed_event(&raw.event_type, "missing acknowledgers")
                })?;
                EventKind::Acknowledge {
                    acknowledgers: acknowledgers.into_iter().map(|a| a.object).collect(),
                }
            }
            EventType::Unacknowledge => EventKind::Unacknowledge,
            EventType::Resolve => {
                let resolver = resolved_by_user.ok_or_else(|| {
                    RelayError::malformed_event(&raw.event_type, "missing resolved_by_user")
                })?;
                EventKind::Resolve { resolver }
            }
            EventType::Assign => EventKind::Assign,
            EventType::Escalate => EventKind::Escalate,
            EventType::Delegate => EventKind::Delegate,
        };

        Ok(Self {
            incident: Incident {
                status,
                html_url,
                service,
                incident_number,
                subject: trigger_summary_data.subject,
                assignees: assigned_to.into_iter().map(|a| a.object).collect(),
            },
            kind,
        })
    }
}

/// The inbound webhook envelope. Elements stay untyped so one bad
/// event can't fail the whole batch.
#[derive(Debug, Deserialize)]
pub struct WebhookBatch {
    pub messages: Vec<Value>,
}

impl WebhookBatch {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| RelayError::MalformedInboundBody(e.to_string()))
    }
}

/// One batch element with only its type tag decoded
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl RawEvent {
    pub fn from_value(value: Value) -> Result<Self> {
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();

        serde_json::from_value(value).map_err(|e| RelayError::malformed_event(&event_type, e))
    }
}

#[derive(Deserialize)]
struct WireData {
    incident: WireIncident,
}

#[derive(Deserialize)]
struct WireIncident {
    status: String,
    html_url: String,
    service: Service,
    incident_number: u64,
    trigger_summary_data: TriggerSummary,
    #[serde(default)]
    assigned_to: Vec<Assignment>,
    acknowledgers: Option<Vec<Assignment>>,
    resolved_by_user: Option<Actor>,
}

#[derive(Deserialize)]
struct TriggerSummary {
    subject: String,
}

#[derive(Deserialize)]
struct Assignment {
    object: Actor,
}
