//! An in-memory [`Queue`] test double.
//!
//! Favors an in-crate test helper over hitting a real broker in unit tests. It is not
//! broker-backed, carries no visibility-timeout semantics, and is only ever constructed
//! directly by tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Queue, ReceiveOutcome};
use crate::error::QueueError;
use crate::message::{Handle, Message, QueueId};

struct Inner {
    pending: VecDeque<(u64, Vec<u8>)>,
    next_id: u64,
    acked: Vec<u64>,
    nacked: Vec<u64>,
    fail_next_receive: bool,
}

/// An in-memory [`Queue`] for deterministic tests.
///
/// Messages are pushed with [`MemoryQueue::push`] before a test runs a worker iteration, and
/// the resulting dispositions can be inspected afterwards with [`MemoryQueue::acked_ids`] and
/// [`MemoryQueue::nacked_ids`].
pub struct MemoryQueue {
    queue_id: QueueId,
    inner: Mutex<Inner>,
}

impl MemoryQueue {
    /// Creates a new, empty memory queue with the given logical name.
    pub fn new(queue_id: impl Into<QueueId>) -> Self {
        Self {
            queue_id: queue_id.into(),
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                next_id: 0,
                acked: Vec::new(),
                nacked: Vec::new(),
                fail_next_receive: false,
            }),
        }
    }

    /// Enqueues a payload to be returned by a future `receive()` call.
    pub fn push(&self, payload: impl Into<Vec<u8>>) -> u64 {
        let mut inner = self.inner.lock().expect("memory queue mutex poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.pending.push_back((id, payload.into()));
        id
    }

    /// Makes the next `receive()` call return a transient error instead of draining `pending`.
    pub fn fail_next_receive(&self) {
        self.inner.lock().expect("memory queue mutex poisoned").fail_next_receive = true;
    }

    /// The ids of every message acked so far, in ack order.
    pub fn acked_ids(&self) -> Vec<u64> {
        self.inner.lock().expect("memory queue mutex poisoned").acked.clone()
    }

    /// The ids of every message nacked so far, in nack order.
    pub fn nacked_ids(&self) -> Vec<u64> {
        self.inner.lock().expect("memory queue mutex poisoned").nacked.clone()
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    fn queue_id(&self) -> &QueueId {
        &self.queue_id
    }

    async fn receive(&self) -> ReceiveOutcome {
        let mut inner = self.inner.lock().expect("memory queue mutex poisoned");

        if inner.fail_next_receive {
            inner.fail_next_receive = false;
            return ReceiveOutcome::Error(QueueError::Config(
                "memory queue forced failure".to_string(),
            ));
        }

        match inner.pending.pop_front() {
            Some((id, payload)) => ReceiveOutcome::Message(Message::new(
                id.to_string(),
                self.queue_id.clone(),
                payload,
                Handle::Memory(id),
            )),
            None => ReceiveOutcome::Empty,
        }
    }

    async fn ack(&self, message: &Message) -> Result<(), QueueError> {
        let Handle::Memory(id) = &message.handle else {
            return Err(QueueError::Config(
                "message did not originate from this memory queue".to_string(),
            ));
        };
        self.inner.lock().expect("memory queue mutex poisoned").acked.push(*id);
        Ok(())
    }

    async fn nack(&self, message: &Message) -> Result<(), QueueError> {
        let Handle::Memory(id) = &message.handle else {
            return Err(QueueError::Config(
                "message did not originate from this memory queue".to_string(),
            ));
        };
        self.inner.lock().expect("memory queue mutex poisoned").nacked.push(*id);
        Ok(())
    }
}
