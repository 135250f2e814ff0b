//! The [Queue] abstraction: a uniform receive / ack / nack interface over heterogeneous brokers.

mod memory;
mod pubsub;
mod sqs;

pub use memory::MemoryQueue;
pub use pubsub::{PubSubConfig, PubSubQueue};
pub use sqs::{SqsConfig, SqsQueue};

use async_trait::async_trait;

use crate::error::QueueError;
use crate::message::{Message, QueueId};

/// The result of a single [`Queue::receive`] attempt.
///
/// `NoMessages` (here `Empty`) is deliberately not part of [`QueueError`]: it is a sentinel
/// condition, not a failure, and the [`Worker`][crate::worker::Worker] treats it differently
/// (idle backoff, not error backoff).
pub enum ReceiveOutcome {
    /// A message was received.
    Message(Message),
    /// The broker had no message available for this queue right now.
    Empty,
    /// A transient broker-side failure occurred while attempting to receive.
    Error(QueueError),
}

/// A handle to a broker subscription.
///
/// Implementations must be safe to share across worker tasks: all workers poll the same
/// ordered list of queues concurrently.
#[async_trait]
pub trait Queue: Send + Sync {
    /// The stable logical name of this queue, as given in configuration.
    fn queue_id(&self) -> &QueueId;

    /// Attempts to retrieve exactly one message.
    ///
    /// Implementations backed by brokers with visibility timeouts or ack deadlines MUST set or
    /// extend the timeout here, so that the caller has the full configured window to process
    /// the message.
    async fn receive(&self) -> ReceiveOutcome;

    /// Permanently removes `message` from the queue (SQS `DeleteMessage`, Pub/Sub `Acknowledge`).
    ///
    /// Called at most once per message per worker; idempotence is not required.
    async fn ack(&self, message: &Message) -> Result<(), QueueError>;

    /// Returns `message` for immediate redelivery, without waiting for its visibility/ack
    /// timeout to expire naturally.
    async fn nack(&self, message: &Message) -> Result<(), QueueError>;
}
