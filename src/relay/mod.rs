use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{RelayError, Result};
use crate::pagerduty::{RawEvent, WebhookBatch};
use crate::transform::transform_raw;
use crate::webhooks::Dispatcher;

/// An event that was dropped from a batch, with its position in it
#[derive(Debug)]
pub struct EventFailure {
    pub index: usize,
    pub error: RelayError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub dispatched: usize,
    pub failures: Vec<EventFailure>,
}

/// Turns inbound PagerDuty batches into chat messages and hands each one
/// to the dispatcher.
pub struct Relay {
    dispatcher: Arc<dyn Dispatcher>,
}

impl Relay {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Only an unreadable envelope is an error. Events that can't be
    /// relayed are logged and listed in the outcome, and their siblings
    /// still go out in batch order.
    pub fn process_batch(&self, body: &[u8]) -> Result<BatchOutcome> {
        let batch = WebhookBatch::parse(body)?;
        let mut outcome = BatchOutcome::default();

        for (index, value) in batch.messages.into_iter().enumerate() {
            match RawEvent::from_value(value).and_then(|raw| transform_raw(&raw)) {
                Ok(message) => {
                    self.dispatcher.dispatch(message);
                    outcome.dispatched += 1;
                }
                Err(error) => {
                    warn!(index, "Skipping event: {}", error);
                    outcome.failures.push(EventFailure { index, error });
                }
            }
        }

        info!(
            dispatched = outcome.dispatched,
            skipped = outcome.failures.len(),
            "Processed PagerDuty batch"
        );
        Ok(outcome)
    }
}
