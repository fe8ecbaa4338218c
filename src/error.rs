use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Malformed inbound body: {0}")]
    MalformedInboundBody(String),

    #[error("Unsupported event type: {0}")]
    UnsupportedEventType(String),

    #[error("Malformed {event_type} event: {reason}")]
    MalformedEvent { event_type: String, reason: String },

    #[error("Delivery failure: {0}")]
    DeliveryFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How far an error reaches once raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The whole inbound request is rejected, nothing is dispatched.
    RejectBatch,
    /// Only the offending event is dropped, its siblings carry on.
    SkipEvent,
    /// Seen by the delivery task alone and logged.
    LogOnly,
    /// Startup cannot continue.
    Abort,
}

impl RelayError {
    pub fn scope(&self) -> ErrorScope {
        match self {
            RelayError::MalformedInboundBody(_) => ErrorScope::RejectBatch,
            RelayError::UnsupportedEventType(_) => ErrorScope::SkipEvent,
            RelayError::MalformedEvent { .. } => ErrorScope::SkipEvent,
            RelayError::DeliveryFailure(_) => ErrorScope::LogOnly,
            RelayError::ConfigError(_) => ErrorScope::Abort,
            RelayError::ServerError(_) => ErrorScope::Abort,
            RelayError::Io(_) => ErrorScope::Abort,
        }
    }

    pub(crate) fn malformed_event(event_type: &str, reason: impl ToString) -> Self {
        RelayError::MalformedEvent {
            event_type: event_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<toml::de::Error> for RelayError {
    fn from(err: toml::de::Error) -> Self {
        RelayError::ConfigError(format!("Failed to parse TOML config: {}", err))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::DeliveryFailure(format!("request timed out: {}", err))
        } else {
            RelayError::DeliveryFailure(err.to_string())
        }
    }
}
