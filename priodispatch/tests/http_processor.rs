//! Status-code classification for the reference [`HttpProcessor`], against a local HTTP server.

use priodispatch::message::QueueId;
use priodispatch::processor::http::{HttpConfig, HttpProcessor};
use priodispatch::processor::{Processor, ProcessorOutcome};
use priodispatch::queue::MemoryQueue;
use priodispatch::queue::Queue;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, fatal_codes: Vec<u16>) -> HttpConfig {
    HttpConfig {
        subscriber_url: format!("{}/dispatch", server.uri()),
        method: "POST".to_string(),
        timeout_seconds: 5,
        fatal_codes,
        content_type: "application/json".to_string(),
    }
}

async fn receive_one(queue: &MemoryQueue) -> priodispatch::message::Message {
    match queue.receive().await {
        priodispatch::queue::ReceiveOutcome::Message(message) => message,
        _ => panic!("expected a message"),
    }
}

#[tokio::test]
async fn success_status_is_classified_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let processor = HttpProcessor::new(config_for(&server, vec![])).unwrap();

    let queue = MemoryQueue::new(QueueId::new("q"));
    queue.push("payload");
    let message = receive_one(&queue).await;

    let outcome = processor
        .run(CancellationToken::new(), &message, None)
        .await;
    assert!(matches!(outcome, ProcessorOutcome::Success));
}

#[tokio::test]
async fn server_error_is_classified_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let processor = HttpProcessor::new(config_for(&server, vec![])).unwrap();

    let queue = MemoryQueue::new(QueueId::new("q"));
    queue.push("payload");
    let message = receive_one(&queue).await;

    let outcome = processor
        .run(CancellationToken::new(), &message, None)
        .await;
    assert!(matches!(outcome, ProcessorOutcome::Fail(_)));
}

#[tokio::test]
async fn configured_fatal_code_overrides_status_class() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    // 422 would normally be a `Fail`, but it's listed as fatal here.
    let processor = HttpProcessor::new(config_for(&server, vec![422])).unwrap();

    let queue = MemoryQueue::new(QueueId::new("q"));
    queue.push("payload");
    let message = receive_one(&queue).await;

    let outcome = processor
        .run(CancellationToken::new(), &message, None)
        .await;
    assert!(matches!(outcome, ProcessorOutcome::Fatal(_)));
}

#[tokio::test]
async fn cancellation_before_response_is_classified_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let processor = HttpProcessor::new(config_for(&server, vec![])).unwrap();

    let queue = MemoryQueue::new(QueueId::new("q"));
    queue.push("payload");
    let message = receive_one(&queue).await;

    let ctx = CancellationToken::new();
    ctx.cancel();

    let outcome = processor.run(ctx, &message, None).await;
    assert!(matches!(outcome, ProcessorOutcome::Cancelled));
}
