//! The [Message] type and the identifiers used to route it back to its origin.

use std::fmt;
use std::time::Instant;

use google_cloud_pubsub::subscriber::ReceivedMessage;

/// The stable logical name of a queue, as given in configuration.
///
/// Wrapping this in its own type means a [`Message`] can never be accidentally
/// disposed of against the wrong queue just because both are plain `String`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueId(String);

impl QueueId {
    /// Creates a new queue id from anything that can be turned into a `String`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the queue id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueueId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for QueueId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A broker-private handle carried alongside a [`Message`], used only by the
/// [`Queue`][crate::queue::Queue] implementation that produced it to ack/nack the message.
#[derive(Debug, Clone)]
pub(crate) enum Handle {
    /// An SQS receipt handle.
    Sqs(String),
    /// A Pub/Sub received message, which carries its own ack id and client reference.
    PubSub(ReceivedMessage),
    /// An in-memory handle used by the test double queue.
    Memory(u64),
}

/// An immutable record produced by a [`Queue`][crate::queue::Queue].
///
/// A `Message` received but neither acked nor nacked remains owned by the worker that
/// received it until disposition. It is never cloned: cloning would make it possible for
/// two workers to believe they each own the same in-flight message.
#[derive(Debug)]
pub struct Message {
    id: String,
    queue_id: QueueId,
    payload: Vec<u8>,
    received_at: Instant,
    pub(crate) handle: Handle,
}

impl Message {
    /// Constructs a new message. Only [`Queue`][crate::queue::Queue] implementations should call this.
    pub(crate) fn new(id: String, queue_id: QueueId, payload: Vec<u8>, handle: Handle) -> Self {
        Self {
            id,
            queue_id,
            payload,
            received_at: Instant::now(),
            handle,
        }
    }

    /// The broker-assigned identifier of this message, unique within its queue.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The logical name of the queue this message was received from.
    pub fn queue_id(&self) -> &QueueId {
        &self.queue_id
    }

    /// The opaque message payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// How long ago this message was received. Used only for logging, never for dispatch.
    pub fn age(&self) -> std::time::Duration {
        self.received_at.elapsed()
    }
}
