//! Per-kind send operations
//!
//! Each operation performs exactly one send. The loop, error accounting and
//! shutdown handling live in [`Publisher`](super::Publisher) and are shared by
//! all kinds.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SendError;
use crate::payload::PayloadFactory;
use crate::traits::{BlobBucket, BrokerClient, KvBucket, PublisherKind};

/// "Perform one send" capability injected into a publisher
#[async_trait]
pub trait SendOp: Send + Sync {
    /// Kind whose counters this operation feeds
    fn kind(&self) -> PublisherKind;

    /// Subject, key or object name written to
    fn target(&self) -> &str;

    /// Build a payload and perform one broker operation
    async fn send(&self, publisher_id: usize, sequence: u64) -> Result<(), SendError>;
}

/// Core publish to `{prefix}.{id}`
pub struct PlainPublish {
    broker: Arc<dyn BrokerClient>,
    subject: String,
    payloads: PayloadFactory,
}

impl PlainPublish {
    /// Create a plain publish operation
    pub fn new(broker: Arc<dyn BrokerClient>, subject: String, payloads: PayloadFactory) -> Self {
        Self {
            broker,
            subject,
            payloads,
        }
    }
}

#[async_trait]
impl SendOp for PlainPublish {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Plain
    }

    fn target(&self) -> &str {
        &self.subject
    }

    async fn send(&self, publisher_id: usize, sequence: u64) -> Result<(), SendError> {
        let payload = self.payloads.message(publisher_id, self.kind(), sequence)?;
        self.broker.publish(&self.subject, payload).await
    }
}

/// Stream-acknowledged publish
pub struct DurablePublish {
    broker: Arc<dyn BrokerClient>,
    subject: String,
    payloads: PayloadFactory,
}

impl DurablePublish {
    /// Create a durable publish operation
    pub fn new(broker: Arc<dyn BrokerClient>, subject: String, payloads: PayloadFactory) -> Self {
        Self {
            broker,
            subject,
            payloads,
        }
    }
}

#[async_trait]
impl SendOp for DurablePublish {
    fn kind(&self) -> PublisherKind {
        PublisherKind::DurableStream
    }

    fn target(&self) -> &str {
        &self.subject
    }

    async fn send(&self, publisher_id: usize, sequence: u64) -> Result<(), SendError> {
        let payload = self.payloads.message(publisher_id, self.kind(), sequence)?;
        self.broker.durable_publish(&self.subject, payload).await
    }
}

/// Request with a bounded wait for the reply
pub struct RequestReply {
    broker: Arc<dyn BrokerClient>,
    subject: String,
    timeout: Duration,
    payloads: PayloadFactory,
}

impl RequestReply {
    /// Create a request-reply operation
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        subject: String,
        timeout: Duration,
        payloads: PayloadFactory,
    ) -> Self {
        Self {
            broker,
            subject,
            timeout,
            payloads,
        }
    }
}

#[async_trait]
impl SendOp for RequestReply {
    fn kind(&self) -> PublisherKind {
        PublisherKind::RequestReply
    }

    fn target(&self) -> &str {
        &self.subject
    }

    async fn send(&self, publisher_id: usize, sequence: u64) -> Result<(), SendError> {
        let payload = self.payloads.message(publisher_id, self.kind(), sequence)?;
        self.broker
            .request(&self.subject, payload, self.timeout)
            .await
            .map(|_reply| ())
    }
}

/// Put to a key-value bucket
pub struct KvPut {
    bucket: Arc<dyn KvBucket>,
    key: String,
    payloads: PayloadFactory,
}

impl KvPut {
    /// Create a key-value put operation against a provisioned bucket
    pub fn new(bucket: Arc<dyn KvBucket>, key: String, payloads: PayloadFactory) -> Self {
        Self {
            bucket,
            key,
            payloads,
        }
    }
}

#[async_trait]
impl SendOp for KvPut {
    fn kind(&self) -> PublisherKind {
        PublisherKind::KeyValue
    }

    fn target(&self) -> &str {
        &self.key
    }

    async fn send(&self, publisher_id: usize, sequence: u64) -> Result<(), SendError> {
        let payload = self.payloads.message(publisher_id, self.kind(), sequence)?;
        self.bucket.put(&self.key, payload).await
    }
}

/// Put to an object store bucket
pub struct BlobPut {
    bucket: Arc<dyn BlobBucket>,
    name: String,
    payloads: PayloadFactory,
}

impl BlobPut {
    /// Create an object put operation against a provisioned bucket
    pub fn new(bucket: Arc<dyn BlobBucket>, name: String, payloads: PayloadFactory) -> Self {
        Self {
            bucket,
            name,
            payloads,
        }
    }
}

#[async_trait]
impl SendOp for BlobPut {
    fn kind(&self) -> PublisherKind {
        PublisherKind::Blob
    }

    fn target(&self) -> &str {
        &self.name
    }

    async fn send(&self, _publisher_id: usize, _sequence: u64) -> Result<(), SendError> {
        self.bucket.put(&self.name, self.payloads.blob()).await
    }
}
