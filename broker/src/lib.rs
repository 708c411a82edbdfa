//! NATS implementation of the loadgen broker seam
//!
//! This crate implements [`BrokerClient`] on top of `async-nats`:
//!
//! - Core publish and request-reply
//! - JetStream publish with acknowledgement
//! - JetStream key-value buckets
//! - JetStream object stores
//!
//! Provisioned resources use memory storage (streams) and a one-hour max age.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;
use std::time::Duration;

use async_nats::jetstream::{self, kv, object_store, stream};
use async_nats::client::{RequestError, RequestErrorKind};
use async_nats::{ConnectOptions, Request};
use async_trait::async_trait;
use bytes::Bytes;
use loadgen_core::{BlobBucket, BrokerClient, KvBucket, ProvisionError, PublisherKind, SendError};

/// Max age of streams and buckets created by the tool
const RESOURCE_MAX_AGE: Duration = Duration::from_secs(3600);

/// Connection name reported to the server
const CONNECTION_NAME: &str = "nats-loadgen";

/// Connection failure
#[derive(Debug, thiserror::Error)]
#[error("failed to connect to NATS at {url}: {reason}")]
pub struct ConnectError {
    /// Server URL that was tried
    pub url: String,
    /// Client-supplied reason
    pub reason: String,
}

/// Map a failed request onto the send error the publishers count
///
/// Timeouts and missing responders keep their own variants; anything else
/// is a generic broker error.
fn send_error(err: RequestError, timeout: Duration) -> SendError {
    match err.kind() {
        RequestErrorKind::TimedOut => SendError::Timeout(timeout),
        RequestErrorKind::NoResponders => SendError::NoResponders,
        _ => SendError::broker(err),
    }
}

/// Memory-backed stream capturing every subject under `subject_prefix`
fn stream_config(name: &str, subject_prefix: &str) -> stream::Config {
    stream::Config {
        name: name.to_string(),
        subjects: vec![format!("{subject_prefix}.>")],
        storage: stream::StorageType::Memory,
        max_age: RESOURCE_MAX_AGE,
        ..Default::default()
    }
}

/// Key-value bucket expiring entries after the resource max age
fn kv_config(bucket: &str) -> kv::Config {
    kv::Config {
        bucket: bucket.to_string(),
        max_age: RESOURCE_MAX_AGE,
        ..Default::default()
    }
}

/// Object store bucket expiring objects after the resource max age
fn object_store_config(bucket: &str) -> object_store::Config {
    object_store::Config {
        bucket: bucket.to_string(),
        max_age: RESOURCE_MAX_AGE,
        ..Default::default()
    }
}

/// Broker client backed by a NATS connection
#[derive(Clone)]
pub struct NatsBroker {
    client: async_nats::Client,
    jetstream: jetstream::Context,
}

impl NatsBroker {
    /// Connect to `url`
    ///
    /// Reconnects forever with a one-second delay once connected.
    pub async fn connect(url: &str) -> Result<Self, ConnectError> {
        tracing::info!(url, "Connecting to NATS");

        let client = ConnectOptions::new()
            .name(CONNECTION_NAME)
            .reconnect_delay_callback(|_attempts| Duration::from_secs(1))
            .connect(url)
            .await
            .map_err(|e| ConnectError {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(url, "Connected to NATS");
        Ok(Self::from_client(client))
    }

    /// Wrap an existing connection
    pub fn from_client(client: async_nats::Client) -> Self {
        let jetstream = jetstream::new(client.clone());
        Self { client, jetstream }
    }

    /// Flush buffered publishes to the server
    pub async fn flush(&self) -> Result<(), SendError> {
        self.client.flush().await.map_err(SendError::broker)
    }
}

impl std::fmt::Debug for NatsBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBroker")
            .field("state", &self.client.connection_state())
            .finish()
    }
}

#[async_trait]
impl BrokerClient for NatsBroker {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), SendError> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(SendError::broker)
    }

    async fn durable_publish(&self, subject: &str, payload: Bytes) -> Result<(), SendError> {
        let ack = self
            .jetstream
            .publish(subject.to_string(), payload)
            .await
            .map_err(SendError::broker)?;
        ack.await.map_err(SendError::broker)?;
        Ok(())
    }

    async fn request(
        &self,
        subject: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, SendError> {
        let request = Request::new().payload(payload).timeout(Some(timeout));
        self.client
            .send_request(subject.to_string(), request)
            .await
            .map(|reply| reply.payload)
            .map_err(|e| send_error(e, timeout))
    }

    async fn ensure_stream(
        &self,
        name: &str,
        subject_prefix: &str,
    ) -> Result<(), ProvisionError> {
        self.jetstream
            .get_or_create_stream(stream_config(name, subject_prefix))
            .await
            .map_err(|e| ProvisionError::new(PublisherKind::DurableStream, name, e))?;
        Ok(())
    }

    async fn ensure_kv_bucket(&self, bucket: &str) -> Result<Arc<dyn KvBucket>, ProvisionError> {
        let store = match self.jetstream.get_key_value(bucket).await {
            Ok(store) => store,
            Err(_) => {
                let store = self
                    .jetstream
                    .create_key_value(kv_config(bucket))
                    .await
                    .map_err(|e| ProvisionError::new(PublisherKind::KeyValue, bucket, e))?;
                tracing::info!(bucket, "Created KV bucket");
                store
            }
        };
        Ok(Arc::new(NatsKv { store }))
    }

    async fn ensure_blob_bucket(
        &self,
        bucket: &str,
    ) -> Result<Arc<dyn BlobBucket>, ProvisionError> {
        let store = match self.jetstream.get_object_store(bucket).await {
            Ok(store) => store,
            Err(_) => {
                let store = self
                    .jetstream
                    .create_object_store(object_store_config(bucket))
                    .await
                    .map_err(|e| ProvisionError::new(PublisherKind::Blob, bucket, e))?;
                tracing::info!(bucket, "Created object store bucket");
                store
            }
        };
        Ok(Arc::new(NatsObjectStore { store }))
    }
}

/// Key-value bucket handle
struct NatsKv {
    store: kv::Store,
}

#[async_trait]
impl KvBucket for NatsKv {
    async fn put(&self, key: &str, value: Bytes) -> Result<(), SendError> {
        self.store
            .put(key, value)
            .await
            .map(|_revision| ())
            .map_err(SendError::broker)
    }
}

/// Object store handle
struct NatsObjectStore {
    store: object_store::ObjectStore,
}

#[async_trait]
impl BlobBucket for NatsObjectStore {
    async fn put(&self, name: &str, data: Bytes) -> Result<(), SendError> {
        let mut reader: &[u8] = &data;
        self.store
            .put(name, &mut reader)
            .await
            .map(|_info| ())
            .map_err(SendError::broker)
    }
}
