//! Amazon SQS [`Queue`] implementation.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Queue, ReceiveOutcome};
use crate::error::QueueError;
use crate::message::{Handle, Message, QueueId};

/// Per-queue configuration for an SQS-backed queue, as given in the `queues.config` list.
#[derive(Debug, Clone, Deserialize)]
pub struct SqsConfig {
    /// The name of the SQS queue. The queue URL is resolved once from this at construction.
    pub name: String,
    /// Visibility timeout in seconds, applied at receive time. Defaults to 30.
    #[serde(default = "SqsConfig::default_visibility_timeout")]
    pub visibility_timeout: i32,
    /// Overrides the SQS endpoint (e.g. to point at LocalStack).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Overrides the AWS region.
    #[serde(default)]
    pub region: Option<String>,
}

impl SqsConfig {
    /// SQS's own default visibility timeout.
    const fn default_visibility_timeout() -> i32 {
        30
    }
}

/// A [`Queue`] backed by an Amazon SQS queue.
pub struct SqsQueue {
    queue_id: QueueId,
    client: Client,
    queue_url: String,
    visibility_timeout: i32,
}

impl SqsQueue {
    /// SQS long-poll wait time. Chosen to balance efficiency against shutdown responsiveness;
    /// SQS's own maximum is 20 seconds.
    const WAIT_TIME_SECONDS: i32 = 10;

    /// Constructs a new SQS queue, resolving the queue URL from `config.name`.
    pub async fn new(queue_id: QueueId, config: SqsConfig) -> Result<Self, QueueError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;

        let mut sqs_builder = aws_sdk_sqs::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.endpoint {
            sqs_builder = sqs_builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(sqs_builder.build());

        let queue_url = client
            .get_queue_url()
            .queue_name(&config.name)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(e.to_string()))?
            .queue_url()
            .ok_or_else(|| QueueError::Sqs(format!("no queue URL returned for {}", config.name)))?
            .to_string();

        Ok(Self {
            queue_id,
            client,
            queue_url,
            visibility_timeout: config.visibility_timeout,
        })
    }
}

#[async_trait]
impl Queue for SqsQueue {
    fn queue_id(&self) -> &QueueId {
        &self.queue_id
    }

    async fn receive(&self) -> ReceiveOutcome {
        let result = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .visibility_timeout(self.visibility_timeout)
            .wait_time_seconds(Self::WAIT_TIME_SECONDS)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => return ReceiveOutcome::Error(QueueError::Sqs(e.to_string())),
        };

        let Some(sqs_message) = output.messages.unwrap_or_default().into_iter().next() else {
            return ReceiveOutcome::Empty;
        };

        let Some(receipt_handle) = sqs_message.receipt_handle().map(str::to_string) else {
            return ReceiveOutcome::Error(QueueError::Sqs(
                "message had no receipt handle".to_string(),
            ));
        };
        let id = sqs_message.message_id().unwrap_or_default().to_string();
        let body = sqs_message.body().unwrap_or_default().as_bytes().to_vec();

        debug!(queue = %self.queue_id, message_id = %id, "[PRIORITY_PUBSUB] received message from SQS");

        ReceiveOutcome::Message(Message::new(
            id,
            self.queue_id.clone(),
            body,
            Handle::Sqs(receipt_handle),
        ))
    }

    async fn ack(&self, message: &Message) -> Result<(), QueueError> {
        let Handle::Sqs(receipt_handle) = &message.handle else {
            warn!(queue = %self.queue_id, "[PRIORITY_PUBSUB] attempted to ack a message that did not originate from this SQS queue");
            return Err(QueueError::Config(
                "message did not originate from this SQS queue".to_string(),
            ));
        };

        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(e.to_string()))?;

        Ok(())
    }

    async fn nack(&self, message: &Message) -> Result<(), QueueError> {
        let Handle::Sqs(receipt_handle) = &message.handle else {
            warn!(queue = %self.queue_id, "[PRIORITY_PUBSUB] attempted to nack a message that did not originate from this SQS queue");
            return Err(QueueError::Config(
                "message did not originate from this SQS queue".to_string(),
            ));
        };

        // Nacking means making the message immediately visible again, i.e. zeroing its
        // remaining visibility window, rather than waiting for it to expire naturally.
        self.client
            .change_message_visibility()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .visibility_timeout(0)
            .send()
            .await
            .map_err(|e| QueueError::Sqs(e.to_string()))?;

        Ok(())
    }
}
