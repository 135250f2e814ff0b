//! The Worker: drains a fixed, strictly ordered list of queues and dispatches each message it
//! finds to a shared [`Processor`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::message::Message;
use crate::processor::{Processor, ProcessorOutcome};
use crate::queue::{Queue, ReceiveOutcome};
use crate::transform::TransformFunc;

/// How long a worker sleeps after finding every queue empty, before polling again.
const IDLE_BACKOFF: Duration = Duration::from_secs(2);

/// How long a worker sleeps after a queue returns a transient receive error.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Result of a single pass over every configured queue.
enum Signal {
    /// A message was found on this queue; every queue ahead of it in the list was empty.
    Received(Arc<dyn Queue>, Message),
    /// Every queue was empty.
    Idle,
    /// A queue's `receive` call failed transiently; the pass stopped there.
    Error,
}

/// One cooperative polling loop over the shared, strictly ordered queue list.
///
/// Every worker in a pool polls the same list and shares the same `Processor`: there is no
/// per-worker queue assignment, so list order alone determines priority. Workers that finish
/// an empty pass all back off independently, so a later arrival on a high-priority queue is
/// picked up by whichever worker polls next, not necessarily worker 0.
pub struct Worker {
    id: usize,
    queues: Arc<Vec<Arc<dyn Queue>>>,
    processor: Arc<dyn Processor>,
    transform: Option<TransformFunc>,
}

impl Worker {
    /// Builds a worker bound to a shared queue list, processor, and optional transform.
    pub fn new(
        id: usize,
        queues: Arc<Vec<Arc<dyn Queue>>>,
        processor: Arc<dyn Processor>,
        transform: Option<TransformFunc>,
    ) -> Self {
        Self {
            id,
            queues,
            processor,
            transform,
        }
    }

    /// Runs the polling loop until `proc_ctx` is cancelled.
    ///
    /// `proc_ctx` is the Runner's inner, cancelled-first shutdown scope: it is what tells this
    /// worker both to stop starting new receives and to abandon whatever it is currently
    /// processing. The Runner's outer `queue_ctx` is never seen by the worker directly; it is
    /// cancelled only once every worker has returned, as the Runner's own signal that it is
    /// safe to tear down queue resources.
    pub async fn run(&self, proc_ctx: CancellationToken) {
        info!(worker = self.id, "[PRIORITY_PUBSUB] worker started");

        while !proc_ctx.is_cancelled() {
            match self.strict_priority_receive(&proc_ctx).await {
                Signal::Idle => {
                    tokio::select! {
                        biased;
                        () = proc_ctx.cancelled() => break,
                        () = tokio::time::sleep(IDLE_BACKOFF) => {}
                    }
                }
                Signal::Error => {
                    tokio::select! {
                        biased;
                        () = proc_ctx.cancelled() => break,
                        () = tokio::time::sleep(ERROR_BACKOFF) => {}
                    }
                }
                Signal::Received(queue, message) => {
                    self.dispatch(proc_ctx.clone(), queue.as_ref(), message).await;
                }
            }
        }

        info!(worker = self.id, "[PRIORITY_PUBSUB] worker stopped");
    }

    /// Polls every queue in configured order, returning the first message found.
    ///
    /// This is the strict-priority contract: a lower-index queue is always drained ahead of a
    /// higher-index one, with no weighting or round-robin fairness between them.
    async fn strict_priority_receive(&self, proc_ctx: &CancellationToken) -> Signal {
        for queue in self.queues.iter() {
            if proc_ctx.is_cancelled() {
                return Signal::Idle;
            }

            match queue.receive().await {
                ReceiveOutcome::Message(message) => {
                    return Signal::Received(Arc::clone(queue), message);
                }
                ReceiveOutcome::Empty => continue,
                ReceiveOutcome::Error(e) => {
                    warn!(
                        worker = self.id,
                        queue = %queue.queue_id(),
                        error = %e,
                        "[PRIORITY_PUBSUB] receive failed"
                    );
                    return Signal::Error;
                }
            }
        }
        Signal::Idle
    }

    /// Runs a received message through the processor and applies the resulting disposition.
    async fn dispatch(&self, proc_ctx: CancellationToken, queue: &dyn Queue, message: Message) {
        let message_id = message.id().to_string();
        let queue_id = queue.queue_id().clone();

        let outcome = self
            .processor
            .run(proc_ctx, &message, self.transform.as_ref())
            .await;

        match outcome {
            ProcessorOutcome::Success => {
                debug!(worker = self.id, queue = %queue_id, message_id, "[PRIORITY_PUBSUB] processed");
                if let Err(e) = queue.ack(&message).await {
                    error!(worker = self.id, queue = %queue_id, message_id, error = %e, "[PRIORITY_PUBSUB] ack failed");
                }
            }
            ProcessorOutcome::Fail(reason) => {
                warn!(worker = self.id, queue = %queue_id, message_id, reason, "[PRIORITY_PUBSUB] processing failed, nacking");
                if let Err(e) = queue.nack(&message).await {
                    error!(worker = self.id, queue = %queue_id, message_id, error = %e, "[PRIORITY_PUBSUB] nack failed");
                }
            }
            ProcessorOutcome::Fatal(reason) => {
                error!(worker = self.id, queue = %queue_id, message_id, reason, "[PRIORITY_PUBSUB] processing failed fatally, dropping");
                if let Err(e) = queue.ack(&message).await {
                    error!(worker = self.id, queue = %queue_id, message_id, error = %e, "[PRIORITY_PUBSUB] ack of fatal message failed");
                }
            }
            ProcessorOutcome::Cancelled => {
                debug!(worker = self.id, queue = %queue_id, message_id, "[PRIORITY_PUBSUB] processing cancelled, leaving for redelivery");
            }
        }
    }
}
