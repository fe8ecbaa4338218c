pub mod mattermost;

pub use mattermost::{DeliveryTask, MattermostPayload, MattermostWebhook};

use crate::transform::ChatMessage;

/// Hands a message off for delivery.
///
/// Implementations must return without waiting on the network and must
/// not report the delivery outcome back to the caller.
#[cfg_attr(test, mockall::automock)]
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, message: ChatMessage);
}
