//! Deserializable configuration shapes, loaded once at startup.

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::queue::{PubSubConfig, SqsConfig};

/// Top-level configuration, loaded from a single JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The poller strategy and its worker count.
    pub poller: PollerConfig,
    /// The queues to drain, all sharing one broker type, in strict priority order.
    pub queues: QueuesConfig,
    /// The processor every message is dispatched to.
    pub processor: ProcessorConfig,
    /// An optional named transform applied to a message's payload before it reaches the
    /// processor. Omitted entirely means no transform.
    #[serde(default)]
    pub transformer: Option<TransformerConfig>,
}

impl Config {
    /// The only poller strategy currently registered.
    const SIMPLE_POLLER: &'static str = "simple";

    /// Reads and parses a `Config` from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.poller.kind != Self::SIMPLE_POLLER {
            return Err(Error::Config(format!(
                "unknown poller type {:?}",
                self.poller.kind
            )));
        }
        if self.poller.concurrency == 0 {
            return Err(Error::Config(
                "poller.concurrency must be at least 1".to_string(),
            ));
        }
        if self.queues.is_empty() {
            return Err(Error::Config(
                "at least one queue must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// The `poller` section: which polling strategy to run, and how many worker slots it gets.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// The registered poller strategy. Only `"simple"` (strict list-order priority) exists.
    #[serde(rename = "type")]
    pub kind: String,
    /// Number of worker slots sharing the queue list and processor.
    pub concurrency: usize,
}

/// The `queues` section: one broker type shared by every configured queue, in priority order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum QueuesConfig {
    /// All configured queues are Amazon SQS queues.
    AwsSqs(Vec<SqsConfig>),
    /// All configured queues are Google Cloud Pub/Sub subscriptions.
    GcpPubsub(Vec<PubSubConfig>),
}

impl QueuesConfig {
    /// Number of queues configured, regardless of broker type.
    fn is_empty(&self) -> bool {
        match self {
            Self::AwsSqs(entries) => entries.is_empty(),
            Self::GcpPubsub(entries) => entries.is_empty(),
        }
    }
}

/// The `processor` section, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum ProcessorConfig {
    /// The reference HTTP forwarding processor.
    Http(crate::processor::http::HttpConfig),
}

/// The optional `transformer` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformerConfig {
    /// The registered transform name, e.g. `"dapr_aws"`. An empty string means no transform,
    /// equivalent to omitting the section entirely.
    #[serde(rename = "type")]
    pub kind: String,
}
