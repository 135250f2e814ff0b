//! The `dapr_aws` transform: unwraps an SNS-over-SQS envelope.
//!
//! When SNS delivers to SQS without raw message delivery enabled, the SQS body is a JSON
//! envelope carrying the original notification under its `Message` field. Dapr's AWS SNS/SQS
//! pub-sub component produces the same shape, hence the name.

use serde::Deserialize;

use super::TransformError;

#[derive(Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Message")]
    message: String,
}

/// Extracts the `Message` field from an SNS-over-SQS envelope and returns its contents as bytes.
pub fn transform(payload: &[u8]) -> Result<Vec<u8>, TransformError> {
    let envelope: SnsEnvelope = serde_json::from_slice(payload)
        .map_err(|e| TransformError(format!("not a valid SNS envelope: {e}")))?;
    Ok(envelope.message.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::transform;

    #[test]
    fn extracts_message_field() {
        let envelope = br#"{"Type":"Notification","Message":"hello world","TopicArn":"arn:aws:sns:us-east-1:1:t"}"#;
        let body = transform(envelope).unwrap();
        assert_eq!(body, b"hello world");
    }

    #[test]
    fn rejects_malformed_envelope() {
        let err = transform(b"not json").unwrap_err();
        assert!(err.0.contains("not a valid SNS envelope"));
    }
}
