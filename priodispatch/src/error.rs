//! `priodispatch`-specific error types.

use thiserror::Error as ThisError;

/// Errors that may be returned while building or running a [`Runner`][crate::runner::Runner].
///
/// These are startup errors: the process exits before any worker is spawned.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration could not be read, parsed, or was structurally invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A queue or processor could not be constructed from its configuration.
    #[error("failed to construct {what} from configuration: {source}")]
    Factory {
        /// What was being constructed, e.g. `"queue"` or `"processor"`.
        what: &'static str,
        /// The underlying failure.
        source: QueueError,
    },
}

/// Errors surfaced by a [`Queue`][crate::queue::Queue]'s `receive`, `ack`, or `nack` calls.
///
/// These are the `TransientQueue` / `DispositionFailure` kinds from the error taxonomy: they
/// never crash a worker, they are logged and the worker backs off and continues. They only
/// become fatal if they occur during queue construction at startup (see [`Error::Factory`]).
#[derive(Debug, ThisError)]
pub enum QueueError {
    /// An underlying Amazon SQS call failed.
    #[error("SQS error: {0}")]
    Sqs(String),

    /// An underlying Google Cloud Pub/Sub call failed.
    #[error("Pub/Sub error: {0}")]
    PubSub(String),

    /// The queue's configuration was invalid (e.g. an unparseable subscription path).
    #[error("invalid queue configuration: {0}")]
    Config(String),
}

/// Convenience type for a result with `priodispatch`'s startup [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
