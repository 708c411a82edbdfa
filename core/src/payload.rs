//! Payload construction for each publisher kind

use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::config::LoadConfig;
use crate::error::SendError;
use crate::traits::PublisherKind;

/// Random alphanumeric string of `len` characters
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// JSON message body sent by the non-blob publishers
#[derive(Debug, Serialize)]
struct Message<'a> {
    publisher_id: usize,
    publisher_type: &'a str,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

/// Builds payloads according to the message options of a [`LoadConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadFactory {
    message_size: usize,
    blob_size: usize,
    include_timestamp: bool,
    include_sequence: bool,
}

impl PayloadFactory {
    /// Take message options from the run configuration
    pub fn from_config(config: &LoadConfig) -> Self {
        Self {
            message_size: config.message_size_bytes,
            blob_size: config.obj_size_bytes,
            include_timestamp: config.include_timestamp,
            include_sequence: config.include_sequence,
        }
    }

    /// Encode a JSON message for `publisher_id` of `kind`
    pub fn message(
        &self,
        publisher_id: usize,
        kind: PublisherKind,
        sequence: u64,
    ) -> Result<Bytes, SendError> {
        let msg = Message {
            publisher_id,
            publisher_type: kind.payload_type(),
            data: random_string(self.message_size),
            sequence: self.include_sequence.then_some(sequence),
            timestamp: self.include_timestamp.then(|| {
                chrono::Utc::now()
                    .to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
            }),
        };
        Ok(Bytes::from(serde_json::to_vec(&msg)?))
    }

    /// Random object body of the configured blob size
    pub fn blob(&self) -> Bytes {
        Bytes::from(random_string(self.blob_size).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(include_timestamp: bool, include_sequence: bool) -> PayloadFactory {
        PayloadFactory::from_config(&LoadConfig {
            message_size_bytes: 16,
            obj_size_bytes: 64,
            include_timestamp,
            include_sequence,
            ..Default::default()
        })
    }

    #[test]
    fn test_random_string_length_and_charset() {
        let s = random_string(200);
        assert_eq!(s.len(), 200);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(random_string(0).is_empty());
    }

    #[test]
    fn test_message_fields() {
        let bytes = factory(true, true)
            .message(3, PublisherKind::DurableStream, 42)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["publisher_id"], 3);
        assert_eq!(value["publisher_type"], "jetstream");
        assert_eq!(value["sequence"], 42);
        assert_eq!(value["data"].as_str().unwrap().len(), 16);

        let ts = value["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_message_optional_fields_omitted() {
        let bytes = factory(false, false)
            .message(0, PublisherKind::Plain, 1)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["publisher_type"], "normal");
        assert!(value.get("sequence").is_none());
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn test_blob_size() {
        assert_eq!(factory(true, true).blob().len(), 64);
    }
}
