pub mod event;

#[cfg(test)]
pub(crate) mod fixtures;

pub use event::{
    Actor, EventKind, EventType, Incident, IncidentEvent, RawEvent, Service, WebhookBatch,
};
