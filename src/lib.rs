pub mod api;
pub mod config;
pub mod error;
pub mod pagerduty;
pub mod relay;
pub mod transform;
pub mod webhooks;

pub use error::{RelayError, Result};
pub use config::Config;
pub use relay::Relay;
pub use transform::{transform, ChatMessage};
pub use webhooks::{Dispatcher, MattermostWebhook};
