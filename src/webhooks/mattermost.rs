use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::MattermostConfig;
use crate::error::{RelayError, Result};
use crate::transform::ChatMessage;
use crate::webhooks::Dispatcher;

/// Body of a Mattermost incoming-webhook request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MattermostPayload {
    pub icon_url: String,
    pub username: String,
    pub attachments: Vec<ChatMessage>,
}

/// One serialized payload bound for one destination
#[derive(Debug, Clone)]
pub struct DeliveryTask {
    destination: Arc<str>,
    body: Vec<u8>,
}

impl DeliveryTask {
    pub fn new(destination: Arc<str>, payload: &MattermostPayload) -> Result<Self> {
        let body = serde_json::to_vec(payload).map_err(|e| {
            RelayError::DeliveryFailure(format!("Failed to serialize payload: {}", e))
        })?;
        Ok(Self { destination, body })
    }

    /// A single POST, bounded by `timeout`. Never retried.
    pub async fn send(self, client: &Client, timeout: Duration) -> Result<()> {
        let response = client
            .post(self.destination.as_ref())
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(self.body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RelayError::DeliveryFailure(format!(
            "Mattermost webhook failed with status {}: {}",
            status, body
        )))
    }
}

pub struct MattermostWebhook {
    client: Client,
    webhook_url: Arc<str>,
    icon_url: String,
    username: String,
    timeout: Duration,
    in_flight: Option<Arc<Semaphore>>,
    deliveries: TaskTracker,
}

impl MattermostWebhook {
    pub fn new(config: &MattermostConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pagerduty-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url: Arc::from(config.webhook_url.as_str()),
            icon_url: config.icon_url.clone(),
            username: config.username.clone(),
            timeout: config.timeout,
            in_flight: config.max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
            deliveries: TaskTracker::new(),
        })
    }

    pub fn payload(&self, message: ChatMessage) -> MattermostPayload {
        MattermostPayload {
            icon_url: self.icon_url.clone(),
            username: self.username.clone(),
            attachments: vec![message],
        }
    }

    /// Starts delivering `message` on its own task and returns at once.
    ///
    /// The outcome is logged by the task. The handle only exists so a
    /// caller can wait for it; [`Dispatcher::dispatch`] drops it.
    pub fn spawn_delivery(&self, message: ChatMessage) -> JoinHandle<Result<()>> {
        let payload = self.payload(message);
        let client = self.client.clone();
        let destination = self.webhook_url.clone();
        let timeout = self.timeout;
        let in_flight = self.in_flight.clone();

        let delivery = async move {
            // waiting for a permit happens here, off the caller's path
            let _permit = match in_flight {
                Some(limit) => Some(limit.acquire_owned().await.map_err(|e| {
                    RelayError::DeliveryFailure(format!("Delivery limiter closed: {}", e))
                })?),
                None => None,
            };

            DeliveryTask::new(destination, &payload)?
                .send(&client, timeout)
                .await
        };

        let span = info_span!("delivery", id = %Uuid::new_v4());
        self.deliveries.spawn(
            async move {
                let result = delivery.await;
                match &result {
                    Ok(()) => debug!("Mattermost webhook sent successfully"),
                    Err(e) => warn!("Dropping message: {}", e),
                }
                result
            }
            .instrument(span),
        )
    }

    /// Deliveries spawned and not yet finished
    pub fn pending(&self) -> usize {
        self.deliveries.len()
    }

    /// Waits up to `grace` for every spawned delivery to finish. Returns
    /// false, after logging how many were abandoned, if time runs out.
    pub async fn drain(&self, grace: Duration) -> bool {
        self.deliveries.close();

        let pending = self.deliveries.len();
        if pending == 0 {
            return true;
        }
        info!(pending, "Waiting for in-flight deliveries");

        match tokio::time::timeout(grace, self.deliveries.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(abandoned = self.deliveries.len(), "Gave up waiting for deliveries");
                false
            }
        }
    }
}

impl Dispatcher for MattermostWebhook {
    fn dispatch(&self, message: ChatMessage) {
        // fire and forget
        drop(self.spawn_delivery(message));
    }
}
