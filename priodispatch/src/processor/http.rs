//! The reference HTTP [`Processor`]: forwards a message's (optionally transformed) payload to a
//! configured subscriber URL and classifies the result from the HTTP response.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{Processor, ProcessorOutcome};
use crate::error::Error;
use crate::message::Message;
use crate::transform::TransformFunc;

/// Configuration for [`HttpProcessor`], as given in the `processor.config` object.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// The URL every message is forwarded to.
    pub subscriber_url: String,
    /// The HTTP method used for the forwarded request. Defaults to `POST`.
    #[serde(default = "HttpConfig::default_method")]
    pub method: String,
    /// Request timeout in seconds. Defaults to 120.
    #[serde(default = "HttpConfig::default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Status codes that should be treated as `Fatal` (poison pill) rather than `Fail` (retry).
    #[serde(default)]
    pub fatal_codes: Vec<u16>,
    /// The `Content-Type` header sent with the forwarded request. Defaults to `text/plain`.
    #[serde(default = "HttpConfig::default_content_type")]
    pub content_type: String,
}

impl HttpConfig {
    fn default_method() -> String {
        "POST".to_string()
    }

    const fn default_timeout_seconds() -> u64 {
        120
    }

    fn default_content_type() -> String {
        "text/plain".to_string()
    }
}

/// Forwards messages to a single HTTP subscriber endpoint.
///
/// A 2xx response is `Success`. A response whose status is in `fatal_codes` is `Fatal` even if
/// it happens to be 2xx. Everything else, including transport failures, is `Fail`.
pub struct HttpProcessor {
    client: reqwest::Client,
    subscriber_url: String,
    method: Method,
    timeout: Duration,
    fatal_codes: HashSet<u16>,
    content_type: String,
}

impl HttpProcessor {
    /// Builds a processor from its configuration.
    pub fn new(config: HttpConfig) -> Result<Self, Error> {
        let method = config
            .method
            .parse::<Method>()
            .map_err(|e| Error::Config(format!("invalid processor method: {e}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            subscriber_url: config.subscriber_url,
            method,
            timeout: Duration::from_secs(config.timeout_seconds),
            fatal_codes: config.fatal_codes.into_iter().collect(),
            content_type: config.content_type,
        })
    }
}

#[async_trait]
impl Processor for HttpProcessor {
    async fn run(
        &self,
        ctx: CancellationToken,
        message: &Message,
        transform: Option<&TransformFunc>,
    ) -> ProcessorOutcome {
        let body = match transform {
            Some(transform) => match transform(message.payload()) {
                Ok(body) => body,
                Err(e) => {
                    warn!(message_id = message.id(), error = %e, "[PRIORITY_PUBSUB] transform rejected payload");
                    return ProcessorOutcome::Fatal(format!("transform failed: {e}"));
                }
            },
            None => message.payload().to_vec(),
        };

        let request = self
            .client
            .request(self.method.clone(), &self.subscriber_url)
            .header(reqwest::header::CONTENT_TYPE, self.content_type.clone())
            .timeout(self.timeout)
            .body(body)
            .send();

        tokio::select! {
            biased;

            () = ctx.cancelled() => {
                debug!(message_id = message.id(), "[PRIORITY_PUBSUB] processing cancelled before response");
                ProcessorOutcome::Cancelled
            }

            result = request => match result {
                Err(e) => {
                    warn!(message_id = message.id(), error = %e, "[PRIORITY_PUBSUB] subscriber request failed");
                    ProcessorOutcome::Fail(e.to_string())
                }
                Ok(response) => {
                    let status = response.status();
                    if self.fatal_codes.contains(&status.as_u16()) {
                        ProcessorOutcome::Fatal(format!("subscriber returned fatal status {status}"))
                    } else if status.is_success() {
                        ProcessorOutcome::Success
                    } else {
                        ProcessorOutcome::Fail(format!("subscriber returned status {status}"))
                    }
                }
            },
        }
    }
}
