pub mod chat_message;
pub mod registry;


pub use chat_message::{ChatMessage, Field};
pub use registry::{EventStyle, EventTypeRegistry};

use crate::error::Result;
use crate::pagerduty::{Actor, EventKind, IncidentEvent, RawEvent};

/// Joins actors as markdown links with `" & "`. No actors, empty string.
pub fn join_links(actors: &[Actor]) -> String {
    actors
        .iter()
        .map(Actor::link)
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Builds the chat attachment for one incident event.
///
/// Pure: the same event always gives the same message, and nothing
/// outside the event and the static registry is read.
pub fn transform(event: &IncidentEvent) -> ChatMessage {
    let incident = &event.incident;
    let style = EventTypeRegistry::style(event.event_type());

    // used by the fallback, the Assigned to field and assign details
    let assignees = join_links(&incident.assignees);

    let actor = match &event.kind {
        EventKind::Acknowledge { acknowledgers } => Some(join_links(acknowledgers)),
        EventKind::Assign => Some(assignees.clone()),
        EventKind::Resolve { resolver } => Some(resolver.link()),
        _ => None,
    };
    let details = format!(
        "{}[View incident details]({})",
        style.render_details(actor.as_deref()),
        incident.html_url
    );

    let fallback = format!(
        "##### Event \r\nIncident {} ([{}]({}))\r\n\r\n##### Subject\r\n{}\r\n\r\n##### Assigned to\r\n{}\r\n",
        incident.status,
        incident.service.name,
        incident.service.html_url,
        incident.subject,
        assignees,
    );

    let summary = format!(
        "Incident {} ([{}]({})) (#{})",
        incident.status, incident.service.name, incident.service.html_url, incident.incident_number,
    );

    ChatMessage {
        fallback,
        color: style.color.to_string(),
        fields: vec![
            Field::short("Event", summary),
            Field::short("Subject", incident.subject.clone()),
            Field::short("Assigned to", assignees),
            Field::wide(details),
        ],
    }
}

/// Decodes and transforms one batch element.
pub fn transform_raw(raw: &RawEvent) -> Result<ChatMessage> {
    let event = IncidentEvent::from_raw(raw)?;
    Ok(transform(&event))
}
