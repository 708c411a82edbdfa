//! Broker seam and publisher kinds
//!
//! The core never talks to a broker directly. Everything goes through
//! [`BrokerClient`], whose NATS implementation lives in `loadgen-nats`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, SendError};

// ============================================================================
// Publisher Kind
// ============================================================================

/// Delivery semantics a publisher exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublisherKind {
    /// Fire-and-forget core publish
    Plain,
    /// Publish acknowledged by a persistent stream
    DurableStream,
    /// Request with a bounded wait for a reply
    RequestReply,
    /// Key-value bucket put
    KeyValue,
    /// Object store put
    Blob,
}

impl PublisherKind {
    /// All kinds, in launch and report order
    pub const ALL: [PublisherKind; 5] = [
        PublisherKind::Plain,
        PublisherKind::DurableStream,
        PublisherKind::RequestReply,
        PublisherKind::KeyValue,
        PublisherKind::Blob,
    ];

    /// Stable position of this kind inside [`PublisherKind::ALL`]
    pub fn index(self) -> usize {
        match self {
            PublisherKind::Plain => 0,
            PublisherKind::DurableStream => 1,
            PublisherKind::RequestReply => 2,
            PublisherKind::KeyValue => 3,
            PublisherKind::Blob => 4,
        }
    }

    /// Machine-facing name
    pub fn as_str(self) -> &'static str {
        match self {
            PublisherKind::Plain => "plain",
            PublisherKind::DurableStream => "durable-stream",
            PublisherKind::RequestReply => "request-reply",
            PublisherKind::KeyValue => "key-value",
            PublisherKind::Blob => "blob",
        }
    }

    /// Label used in stats lines and the final summary
    pub fn label(self) -> &'static str {
        match self {
            PublisherKind::Plain => "Normal",
            PublisherKind::DurableStream => "JetStream",
            PublisherKind::RequestReply => "Request-Reply",
            PublisherKind::KeyValue => "Key-Value",
            PublisherKind::Blob => "Object Store",
        }
    }

    /// Short label for the single-line periodic report
    pub fn short_label(self) -> &'static str {
        match self {
            PublisherKind::Plain => "Normal",
            PublisherKind::DurableStream => "JS",
            PublisherKind::RequestReply => "ReqRep",
            PublisherKind::KeyValue => "KV",
            PublisherKind::Blob => "Obj",
        }
    }

    /// Value of the `publisher_type` field in JSON payloads
    pub fn payload_type(self) -> &'static str {
        match self {
            PublisherKind::Plain => "normal",
            PublisherKind::DurableStream => "jetstream",
            PublisherKind::RequestReply => "request-reply",
            PublisherKind::KeyValue => "kv",
            PublisherKind::Blob => "object",
        }
    }
}

impl fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Broker Client Trait
// ============================================================================

/// Broker operations consumed by the publishers
///
/// Provisioning calls must be idempotent: they succeed both when the
/// resource is created and when it already exists.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Fire-and-forget publish
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), SendError>;

    /// Publish and wait for the stream acknowledgement
    async fn durable_publish(&self, subject: &str, payload: Bytes) -> Result<(), SendError>;

    /// Send a request and wait up to `timeout` for the reply
    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, SendError>;

    /// Make sure a stream capturing `{subject_prefix}.>` exists
    async fn ensure_stream(&self, name: &str, subject_prefix: &str)
        -> Result<(), ProvisionError>;

    /// Make sure a key-value bucket exists and return a handle to it
    async fn ensure_kv_bucket(&self, bucket: &str) -> Result<Arc<dyn KvBucket>, ProvisionError>;

    /// Make sure an object store bucket exists and return a handle to it
    async fn ensure_blob_bucket(&self, bucket: &str)
        -> Result<Arc<dyn BlobBucket>, ProvisionError>;
}

/// Handle to a provisioned key-value bucket
#[async_trait]
pub trait KvBucket: Send + Sync {
    /// Write `value` under `key`
    async fn put(&self, key: &str, value: Bytes) -> Result<(), SendError>;
}

/// Handle to a provisioned object store bucket
#[async_trait]
pub trait BlobBucket: Send + Sync {
    /// Store `data` as object `name`, replacing any previous revision
    async fn put(&self, name: &str, data: Bytes) -> Result<(), SendError>;
}
