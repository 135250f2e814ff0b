//! The [`Processor`] abstraction: hands a message's payload to application logic and classifies
//! the result into one of three dispositions.

pub mod http;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::message::Message;
use crate::transform::TransformFunc;

/// The outcome of running a single message through a [`Processor`].
///
/// This is the only vocabulary a [`Worker`][crate::worker::Worker] uses to decide disposition:
/// every concrete processor, regardless of transport, must collapse its own richer error space
/// down to one of these four variants.
#[derive(Debug)]
pub enum ProcessorOutcome {
    /// Processing completed successfully. The message should be acked.
    Success,
    /// Processing failed in a way that may succeed on retry. The message should be nacked.
    Fail(String),
    /// Processing failed in a way retry cannot fix (a poison pill). The message should be acked
    /// and dropped, with the failure logged for operator attention.
    Fatal(String),
    /// The processing scope was cancelled before a result was produced. The Worker leaves the
    /// message's disposition to the broker's natural redelivery.
    Cancelled,
}

/// Runs application logic against a single message.
///
/// `ctx` is the Worker's processing cancellation scope: it is cancelled on shutdown once the
/// current message's deadline should no longer be extended. A `Processor` that issues an
/// external call MUST race that call against `ctx.cancelled()` and return
/// [`ProcessorOutcome::Cancelled`] if the scope fires first, rather than blocking shutdown.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Processes `message`, applying `transform` to its payload first if one is configured.
    async fn run(
        &self,
        ctx: CancellationToken,
        message: &Message,
        transform: Option<&TransformFunc>,
    ) -> ProcessorOutcome;
}
