//! The Runner: builds queues, a processor, and an optional transform from configuration, then
//! supervises a worker pool through a two-phase cancellation shutdown.

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::error::Error;
use crate::factory;
use crate::processor::Processor;
use crate::queue::Queue;
use crate::transform::TransformFunc;
use crate::worker::Worker;

/// Supervises a fixed pool of [`Worker`]s sharing one strictly ordered queue list and one
/// processor.
pub struct Runner {
    queues: Arc<Vec<Arc<dyn Queue>>>,
    processor: Arc<dyn Processor>,
    transform: Option<TransformFunc>,
    concurrency: usize,
}

impl Runner {
    /// Builds every queue, the processor, and the transform named by `config`.
    pub async fn build(config: Config) -> Result<Self, Error> {
        let queues = factory::build_queues(&config.queues).await?;
        let processor = factory::build_processor(&config.processor)?;

        let transformer_type = config
            .transformer
            .as_ref()
            .map(|t| t.kind.as_str())
            .unwrap_or("");
        let transform = crate::transform::registry(transformer_type)?;

        Ok(Self {
            queues: Arc::new(queues),
            processor,
            transform,
            concurrency: config.poller.concurrency,
        })
    }

    /// Spawns the worker pool and blocks until a shutdown signal arrives and every worker has
    /// drained its current message.
    ///
    /// Two cancellation scopes govern shutdown. `proc_ctx`, the inner scope, is cancelled first
    /// and immediately: every worker sees it as soon as the signal arrives, stops starting new
    /// receives, and races any in-flight processor call against it. `queue_ctx`, the outer
    /// scope, is cancelled only once every worker task has returned; nothing currently listens
    /// for it directly, but it marks the point at which it is safe to tear down the underlying
    /// queue clients, and gives later queue implementations a hook to do so.
    pub async fn run(&self) {
        let queue_ctx = CancellationToken::new();
        let proc_ctx = queue_ctx.child_token();

        let mut handles = Vec::with_capacity(self.concurrency);
        for id in 0..self.concurrency {
            let worker = Worker::new(
                id,
                Arc::clone(&self.queues),
                Arc::clone(&self.processor),
                self.transform.clone(),
            );
            let ctx = proc_ctx.clone();
            handles.push(tokio::spawn(async move { worker.run(ctx).await }));
        }

        wait_for_shutdown_signal().await;
        info!("[PRIORITY_PUBSUB] shutdown signal received, stopping workers");
        proc_ctx.cancel();

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "[PRIORITY_PUBSUB] worker task panicked");
            }
        }

        queue_ctx.cancel();
        info!("[PRIORITY_PUBSUB] all workers stopped, shutdown complete");
    }
}

/// Waits for either Ctrl-C or, on Unix, `SIGTERM`.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
