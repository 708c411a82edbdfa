//! In-memory broker used by the unit tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ProvisionError, SendError};
use crate::traits::{BlobBucket, BrokerClient, KvBucket, PublisherKind};

/// Broker that records calls and fails on demand
#[derive(Default)]
pub(crate) struct MockBroker {
    /// Kinds whose provisioning call fails
    failing_provision: HashSet<PublisherKind>,
    /// Kinds whose send operations fail
    failing_sends: HashSet<PublisherKind>,
    /// Requests time out instead of getting a reply
    request_timeouts: bool,
    /// Each provisioning call takes this long
    provision_delay: Duration,

    pub sends: Arc<Mutex<Vec<(PublisherKind, String)>>>,
    pub provision_calls: AtomicUsize,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_provision(mut self, kind: PublisherKind) -> Self {
        self.failing_provision.insert(kind);
        self
    }

    pub fn with_failing_sends(mut self, kind: PublisherKind) -> Self {
        self.failing_sends.insert(kind);
        self
    }

    pub fn with_request_timeouts(mut self) -> Self {
        self.request_timeouts = true;
        self
    }

    pub fn with_provision_delay(mut self, delay: Duration) -> Self {
        self.provision_delay = delay;
        self
    }

    pub fn sends_for(&self, kind: PublisherKind) -> Vec<String> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, target)| target.clone())
            .collect()
    }

    fn record(&self, kind: PublisherKind, target: &str) -> Result<(), SendError> {
        if self.failing_sends.contains(&kind) {
            return Err(SendError::broker("simulated failure"));
        }
        self.sends.lock().unwrap().push((kind, target.to_string()));
        Ok(())
    }

    async fn provision(&self, kind: PublisherKind, resource: &str) -> Result<(), ProvisionError> {
        if !self.provision_delay.is_zero() {
            tokio::time::sleep(self.provision_delay).await;
        }
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_provision.contains(&kind) {
            return Err(ProvisionError::new(kind, resource, "simulated provisioning failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    async fn publish(&self, subject: &str, _payload: Bytes) -> Result<(), SendError> {
        self.record(PublisherKind::Plain, subject)
    }

    async fn durable_publish(&self, subject: &str, _payload: Bytes) -> Result<(), SendError> {
        self.record(PublisherKind::DurableStream, subject)
    }

    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, SendError> {
        if self.request_timeouts {
            tokio::time::sleep(timeout).await;
            return Err(SendError::Timeout(timeout));
        }
        self.record(PublisherKind::RequestReply, subject)?;
        Ok(payload)
    }

    async fn ensure_stream(
        &self,
        name: &str,
        _subject_prefix: &str,
    ) -> Result<(), ProvisionError> {
        self.provision(PublisherKind::DurableStream, name).await
    }

    async fn ensure_kv_bucket(&self, bucket: &str) -> Result<Arc<dyn KvBucket>, ProvisionError> {
        self.provision(PublisherKind::KeyValue, bucket).await?;
        Ok(Arc::new(MockBucket {
            kind: PublisherKind::KeyValue,
            fail: self.failing_sends.contains(&PublisherKind::KeyValue),
            sends: Arc::clone(&self.sends),
        }))
    }

    async fn ensure_blob_bucket(
        &self,
        bucket: &str,
    ) -> Result<Arc<dyn BlobBucket>, ProvisionError> {
        self.provision(PublisherKind::Blob, bucket).await?;
        Ok(Arc::new(MockBucket {
            kind: PublisherKind::Blob,
            fail: self.failing_sends.contains(&PublisherKind::Blob),
            sends: Arc::clone(&self.sends),
        }))
    }
}

struct MockBucket {
    kind: PublisherKind,
    fail: bool,
    sends: Arc<Mutex<Vec<(PublisherKind, String)>>>,
}

impl MockBucket {
    fn record(&self, target: &str) -> Result<(), SendError> {
        if self.fail {
            return Err(SendError::broker("simulated failure"));
        }
        self.sends.lock().unwrap().push((self.kind, target.to_string()));
        Ok(())
    }
}

#[async_trait]
impl KvBucket for MockBucket {
    async fn put(&self, key: &str, _value: Bytes) -> Result<(), SendError> {
        self.record(key)
    }
}

#[async_trait]
impl BlobBucket for MockBucket {
    async fn put(&self, name: &str, _data: Bytes) -> Result<(), SendError> {
        self.record(name)
    }
}
