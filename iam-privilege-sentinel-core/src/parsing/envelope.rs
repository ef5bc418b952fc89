//! SNS notification envelopes delivered to Lambda subscribers

use crate::error::{SentinelError, SentinelResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Records")]
    records: Vec<SnsRecord>,
}

#[derive(Debug, Deserialize)]
struct SnsRecord {
    #[serde(rename = "Sns")]
    sns: SnsMessage,
}

#[derive(Debug, Deserialize)]
struct SnsMessage {
    #[serde(rename = "Message")]
    message: String,
}

/// True when the payload looks like an SNS delivery rather than an EventBridge event.
pub fn is_sns_envelope(raw: &Value) -> bool {
    raw.get("Records").is_some_and(Value::is_array)
}

/// Return the raw message string of the first record.
pub fn sns_message(raw: &Value) -> SentinelResult<String> {
    let envelope = SnsEnvelope::deserialize(raw)
        .map_err(|e| SentinelError::malformed_event(format!("not an SNS envelope: {e}")))?;
    envelope
        .records
        .into_iter()
        .next()
        .map(|record| record.sns.message)
        .ok_or_else(|| SentinelError::malformed_event("SNS envelope has no records"))
}

/// Decode the JSON message carried by the first record.
pub fn decode_sns_message<T: DeserializeOwned>(raw: &Value) -> SentinelResult<T> {
    let message = sns_message(raw)?;
    serde_json::from_str(&message).map_err(|e| {
        SentinelError::malformed_event(format!("SNS message is not the expected JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(message: &str) -> Value {
        json!({"Records": [{
            "EventSource": "aws:sns",
            "Sns": {"Type": "Notification", "Subject": null, "Message": message}
        }]})
    }

    #[test]
    fn test_sns_message_returns_first_record() {
        assert_eq!(sns_message(&envelope("hello")).unwrap(), "hello");
    }

    #[test]
    fn test_decode_sns_message() {
        let value: Value = decode_sns_message(&envelope(r#"{"a": [1, 2]}"#)).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_empty_records_is_malformed() {
        let err = sns_message(&json!({"Records": []})).unwrap_err();
        assert!(matches!(err, SentinelError::MalformedEvent(_)));
    }

    #[test]
    fn test_non_json_message_is_malformed() {
        let err = decode_sns_message::<Value>(&envelope("not json")).unwrap_err();
        assert!(matches!(err, SentinelError::MalformedEvent(_)));
    }

    #[test]
    fn test_is_sns_envelope() {
        assert!(is_sns_envelope(&envelope("{}")));
        assert!(!is_sns_envelope(&json!({"detail": {}})));
    }
}
