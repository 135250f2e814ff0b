//! Builds concrete [`Queue`] and [`Processor`] implementations from tagged configuration.

use std::sync::Arc;

use crate::config::{ProcessorConfig, QueuesConfig};
use crate::error::Error;
use crate::message::QueueId;
use crate::processor::http::HttpProcessor;
use crate::processor::Processor;
use crate::queue::{PubSubQueue, Queue, SqsQueue};

/// Constructs every [`Queue`] named by the `queues` section, preserving configured order.
///
/// All queues configured under one `Config` share the same broker type; the returned list's
/// order is the strict priority order workers poll in.
pub async fn build_queues(config: &QueuesConfig) -> Result<Vec<Arc<dyn Queue>>, Error> {
    let mut queues: Vec<Arc<dyn Queue>> = Vec::new();

    match config {
        QueuesConfig::AwsSqs(entries) => {
            for entry in entries {
                let queue_id = QueueId::new(entry.name.clone());
                let queue = SqsQueue::new(queue_id, entry.clone())
                    .await
                    .map_err(|source| Error::Factory {
                        what: "queue",
                        source,
                    })?;
                queues.push(Arc::new(queue));
            }
        }
        QueuesConfig::GcpPubsub(entries) => {
            for entry in entries {
                let queue_id = QueueId::new(entry.subscription_id.clone());
                let queue = PubSubQueue::new(queue_id, entry.clone())
                    .await
                    .map_err(|source| Error::Factory {
                        what: "queue",
                        source,
                    })?;
                queues.push(Arc::new(queue));
            }
        }
    }

    Ok(queues)
}

/// Constructs the [`Processor`] described by the `processor` section.
pub fn build_processor(config: &ProcessorConfig) -> Result<Arc<dyn Processor>, Error> {
    match config {
        ProcessorConfig::Http(http_config) => {
            let processor = HttpProcessor::new(http_config.clone())?;
            Ok(Arc::new(processor))
        }
    }
}
