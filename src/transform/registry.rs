use crate::pagerduty::EventType;

/// Placeholder in a details template where the acting user goes
pub const ACTOR_SLOT: &str = "{}";

/// Presentation of one event type: attachment border color and the
/// lead-in of the details field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStyle {
    pub color: &'static str,
    pub details: &'static str,
}

impl EventStyle {
    pub fn has_actor_slot(&self) -> bool {
        self.details.contains(ACTOR_SLOT)
    }

    // only the template is formatted, never the text after it
    pub fn render_details(&self, actor: Option<&str>) -> String {
        match actor {
            Some(actor) => {
                debug_assert!(self.has_actor_slot(), "no actor slot in {:?}", self.details);
                self.details.replacen(ACTOR_SLOT, actor, 1)
            }
            None => self.details.to_string(),
        }
    }
}

static TRIGGER: EventStyle = EventStyle {
    color: "#FF0000",
    details: "",
};
static ACKNOWLEDGE: EventStyle = EventStyle {
    color: "#FFFF00",
    details: "Acknowledged by {}. ",
};
static UNACKNOWLEDGE: EventStyle = EventStyle {
    color: "#FFFF00",
    details: "",
};
static RESOLVE: EventStyle = EventStyle {
    color: "good",
    details: "Resolved by {}. ",
};
static ASSIGN: EventStyle = EventStyle {
    color: "#FFFF00",
    details: "Assigned to {}. ",
};
static ESCALATE: EventStyle = EventStyle {
    color: "#FF0000",
    details: "Incident escalated ",
};
static DELEGATE: EventStyle = EventStyle {
    color: "#FFFF00",
    details: "",
};

/// Read-only mapping from event type to its [`EventStyle`].
pub struct EventTypeRegistry;

impl EventTypeRegistry {
    pub fn style(event_type: EventType) -> &'static EventStyle {
        match event_type {
            EventType::Trigger => &TRIGGER,
            EventType::Acknowledge => &ACKNOWLEDGE,
            EventType::Unacknowledge => &UNACKNOWLEDGE,
            EventType::Resolve => &RESOLVE,
            EventType::Assign => &ASSIGN,
            EventType::Escalate => &ESCALATE,
            EventType::Delegate => &DELEGATE,
        }
    }
}
