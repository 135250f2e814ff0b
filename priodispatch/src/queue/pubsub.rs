//! Google Cloud Pub/Sub [`Queue`] implementation.

use async_trait::async_trait;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::subscription::Subscription;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Queue, ReceiveOutcome};
use crate::error::QueueError;
use crate::message::{Handle, Message, QueueId};

/// Per-queue configuration for a Pub/Sub-backed queue, as given in the `queues.config` list.
#[derive(Debug, Clone, Deserialize)]
pub struct PubSubConfig {
    /// The full resource path, `projects/<project>/subscriptions/<subscription>`.
    pub subscription_id: String,
    /// Ack deadline in seconds, extended to this value at receive time. Defaults to 60.
    #[serde(default = "PubSubConfig::default_ack_deadline_seconds")]
    pub ack_deadline_seconds: i32,
    /// Overrides the Pub/Sub endpoint (e.g. to point at the Pub/Sub emulator).
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl PubSubConfig {
    /// Pub/Sub's own default ack deadline.
    const fn default_ack_deadline_seconds() -> i32 {
        60
    }

    /// Parses the project id out of `projects/<project>/subscriptions/<subscription>`.
    fn project_id(&self) -> Result<&str, QueueError> {
        self.subscription_id
            .strip_prefix("projects/")
            .and_then(|rest| rest.split('/').next())
            .filter(|project| !project.is_empty())
            .ok_or_else(|| {
                QueueError::Config(format!(
                    "subscription_id {:?} is not a full resource path of the form \
                     projects/<project>/subscriptions/<subscription>",
                    self.subscription_id
                ))
            })
    }

    /// The bare subscription name, without the `projects/<project>/subscriptions/` prefix.
    fn subscription_name(&self) -> Result<&str, QueueError> {
        self.subscription_id
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                QueueError::Config(format!(
                    "subscription_id {:?} has no subscription name component",
                    self.subscription_id
                ))
            })
    }
}

/// A [`Queue`] backed by a Google Cloud Pub/Sub subscription.
pub struct PubSubQueue {
    queue_id: QueueId,
    subscription: Subscription,
    ack_deadline_seconds: i32,
}

impl PubSubQueue {
    /// Constructs a new Pub/Sub queue bound to `config.subscription_id`.
    pub async fn new(queue_id: QueueId, config: PubSubConfig) -> Result<Self, QueueError> {
        let project_id = config.project_id()?.to_string();
        let subscription_name = config.subscription_name()?.to_string();

        // The emulator host is read from this environment variable by the client at
        // construction time; there is no first-class config knob for it in `ClientConfig`.
        if let Some(endpoint) = &config.endpoint {
            std::env::set_var("PUBSUB_EMULATOR_HOST", endpoint);
        }

        let client = Client::new(&project_id, Some(ClientConfig::default()))
            .await
            .map_err(|e| QueueError::PubSub(e.to_string()))?;

        let subscription = client.subscription(&subscription_name);

        Ok(Self {
            queue_id,
            subscription,
            ack_deadline_seconds: config.ack_deadline_seconds,
        })
    }
}

#[async_trait]
impl Queue for PubSubQueue {
    fn queue_id(&self) -> &QueueId {
        &self.queue_id
    }

    async fn receive(&self) -> ReceiveOutcome {
        let messages = match self.subscription.pull(1, None, None).await {
            Ok(messages) => messages,
            Err(e) => return ReceiveOutcome::Error(QueueError::PubSub(e.to_string())),
        };

        let Some(received) = messages.into_iter().next() else {
            return ReceiveOutcome::Empty;
        };

        if let Err(e) = received
            .modify_ack_deadline(self.ack_deadline_seconds)
            .await
        {
            return ReceiveOutcome::Error(QueueError::PubSub(e.to_string()));
        }

        let id = received.message.message_id.clone();
        let body = received.message.data.clone();

        debug!(queue = %self.queue_id, message_id = %id, "[PRIORITY_PUBSUB] received message from Pub/Sub");

        ReceiveOutcome::Message(Message::new(
            id,
            self.queue_id.clone(),
            body,
            Handle::PubSub(received),
        ))
    }

    async fn ack(&self, message: &Message) -> Result<(), QueueError> {
        let Handle::PubSub(received) = &message.handle else {
            warn!(queue = %self.queue_id, "[PRIORITY_PUBSUB] attempted to ack a message that did not originate from this Pub/Sub queue");
            return Err(QueueError::Config(
                "message did not originate from this Pub/Sub queue".to_string(),
            ));
        };

        received
            .ack()
            .await
            .map_err(|e| QueueError::PubSub(e.to_string()))
    }

    async fn nack(&self, message: &Message) -> Result<(), QueueError> {
        let Handle::PubSub(received) = &message.handle else {
            warn!(queue = %self.queue_id, "[PRIORITY_PUBSUB] attempted to nack a message that did not originate from this Pub/Sub queue");
            return Err(QueueError::Config(
                "message did not originate from this Pub/Sub queue".to_string(),
            ));
        };

        // Setting the ack deadline to zero makes the message immediately redeliverable,
        // rather than waiting for the existing deadline to expire naturally.
        received
            .modify_ack_deadline(0)
            .await
            .map_err(|e| QueueError::PubSub(e.to_string()))
    }
}
