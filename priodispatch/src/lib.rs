//! # priodispatch
//!
//! A strict-priority polling and dispatch engine for worker pools draining SQS and Google Cloud
//! Pub/Sub queues, with at-least-once delivery and graceful two-phase cancellation shutdown.

#![forbid(unsafe_code)]
#![warn(
    // Warns on ::path, allows crate::path.
    absolute_paths_not_starting_with_crate,

    // Warns you about missing documentation comments.
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,

    // Warns you when you have dependencies you're not using.
    unused_crate_dependencies,

    // Warns on converting values using the `as` keyword.
    clippy::as_conversions,
)]

pub mod config;
pub mod error;
pub mod factory;
pub mod message;
pub mod processor;
pub mod queue;
pub mod runner;
pub mod transform;
pub mod worker;

pub use config::Config;
pub use error::Error;
pub use message::{Message, QueueId};
pub use processor::{Processor, ProcessorOutcome};
pub use queue::Queue;
pub use runner::Runner;

/// Convenience type for a result with `priodispatch`'s startup [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
