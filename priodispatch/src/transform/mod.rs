//! Optional pure payload-to-payload transforms, applied before a message reaches a [`Processor`][crate::processor::Processor].

pub mod dapr_aws;

use std::sync::Arc;

use thiserror::Error as ThisError;

use crate::error::Error;

/// An error produced while transforming a payload. Always classified `Fatal` by the caller,
/// since a malformed payload will never succeed on redelivery.
#[derive(Debug, ThisError)]
#[error("{0}")]
pub struct TransformError(pub String);

/// Pure mapping `bytes -> bytes | error`. Must not retain references to its input.
pub type TransformFn = dyn Fn(&[u8]) -> Result<Vec<u8>, TransformError> + Send + Sync;

/// A shareable handle to a [`TransformFn`], cheap to clone and hand to every worker.
pub type TransformFunc = Arc<TransformFn>;

/// Resolves a configured transformer `type` string to a concrete [`TransformFunc`].
///
/// An empty string means "no transform"; processors then receive the payload as-is.
pub fn registry(type_name: &str) -> Result<Option<TransformFunc>, Error> {
    match type_name {
        "" => Ok(None),
        "dapr_aws" => {
            let transform: TransformFunc = Arc::new(dapr_aws::transform);
            Ok(Some(transform))
        }
        other => Err(Error::Config(format!(
            "unknown transformer type {other:?}"
        ))),
    }
}
