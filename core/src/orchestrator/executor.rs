//! Orchestrator execution logic

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::LoadConfig;
use crate::error::{LoadError, LoadResult, ProvisionError};
use crate::payload::PayloadFactory;
use crate::publisher::{
    BlobPut, DurablePublish, KvPut, PlainPublish, Publisher, PublisherBuilder, RequestReply, SendOp,
};
use crate::reporter::StatsReporter;
use crate::shutdown::ShutdownSignal;
use crate::signals::wait_for_shutdown_signal;
use crate::stats::{StatCounters, StatsSnapshot};
use crate::traits::{BlobBucket, BrokerClient, KvBucket, PublisherKind};

/// Broker handles obtained by a kind's one-time provisioning
enum Provisioned {
    /// Kind sends through the client itself
    Client,
    Kv(Arc<dyn KvBucket>),
    Blob(Arc<dyn BlobBucket>),
}

/// Orchestrator manages the run lifecycle
///
/// Responsible for provisioning, spawning publishers, coordinating
/// shutdown and producing the final snapshot.
pub struct Orchestrator {
    /// Broker client (shared across publishers)
    pub(crate) broker: Arc<dyn BrokerClient>,

    /// Shutdown signal observed by every task
    pub(crate) shutdown: ShutdownSignal,

    /// Optional bound on the post-shutdown wait
    pub(crate) grace_period: Option<Duration>,

    /// Optional channel receiving periodic snapshots
    pub(crate) report_sink: Option<mpsc::Sender<StatsSnapshot>>,
}

impl Orchestrator {
    /// Get a handle to the shutdown signal
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Trigger shutdown of all tasks
    pub fn shutdown(&self) {
        self.shutdown.fire();
    }

    /// Run the load until shutdown fires
    ///
    /// Validates `config`, provisions each kind, spawns the publishers and
    /// the reporter, then waits for all of them to return. The returned
    /// snapshot is taken after the last task finished.
    ///
    /// # Errors
    ///
    /// [`LoadError::Config`] if the config is invalid (nothing is started),
    /// [`LoadError::NoPublishersStarted`] if every kind failed provisioning.
    pub async fn run(&self, config: &LoadConfig) -> LoadResult<StatsSnapshot> {
        config.validate()?;

        let stats = Arc::new(StatCounters::new());
        let payloads = PayloadFactory::from_config(config);
        let mut publishers: Vec<(String, Publisher)> =
            Vec::with_capacity(config.total_publishers());
        let mut skipped = 0;

        tracing::info!(
            total = config.total_publishers(),
            "Starting publishers"
        );

        // every publisher is built before the first one is spawned
        for kind in PublisherKind::ALL {
            let count = config.instances(kind);
            if count == 0 {
                continue;
            }

            let provisioned = match self.provision(kind, config).await {
                Ok(p) => p,
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        kind = %kind,
                        skipped_instances = count,
                        error = %e,
                        "Provisioning failed, skipping kind"
                    );
                    continue;
                }
            };

            for publisher_id in 0..count {
                let op = self.send_op(kind, publisher_id, config, payloads, &provisioned);
                let publisher = PublisherBuilder::new(publisher_id)
                    .op(op)
                    .interval(config.interval(kind))
                    .stats(Arc::clone(&stats))
                    .shutdown(self.shutdown.clone())
                    .build()?;
                publishers.push((format!("{kind}-{publisher_id}"), publisher));
            }

            tracing::info!(
                kind = %kind,
                instances = count,
                interval_ms = config.interval(kind).as_millis() as u64,
                "Publishers ready"
            );
        }

        if publishers.is_empty() {
            return Err(LoadError::NoPublishersStarted { skipped });
        }

        let mut handles: Vec<(String, JoinHandle<u64>)> = Vec::with_capacity(publishers.len() + 1);
        for (unit, publisher) in publishers {
            handles.push((unit, tokio::spawn(publisher.run())));
        }
        let publishers = handles.len();

        if let Some(interval) = config.stats_interval() {
            let mut reporter =
                StatsReporter::new(Arc::clone(&stats), interval, self.shutdown.clone());
            if let Some(sink) = &self.report_sink {
                reporter = reporter.with_sink(sink.clone());
            }
            handles.push((
                "stats-reporter".to_string(),
                tokio::spawn(async move { reporter.run().await as u64 }),
            ));
        }

        tracing::info!(publishers, "All publishers started");

        let abandoned = self.wait_all(handles).await;

        let snapshot = stats.snapshot();
        tracing::info!(
            elapsed_secs = snapshot.elapsed.as_secs_f64(),
            total_sent = snapshot.total_sent(),
            total_errors = snapshot.total_errors(),
            rate = snapshot.rate(),
            abandoned,
            "Run completed"
        );

        Ok(snapshot)
    }

    /// Run with OS signal handling
    ///
    /// Fires the shutdown signal on SIGINT/SIGTERM/SIGQUIT (Ctrl-C off Unix).
    pub async fn run_with_signal_handling(
        &self,
        config: &LoadConfig,
    ) -> LoadResult<StatsSnapshot> {
        let shutdown = self.shutdown.clone();

        let signal_handle = tokio::spawn(async move {
            match wait_for_shutdown_signal().await {
                Ok(()) => {
                    tracing::info!("Received termination signal, shutting down...");
                    shutdown.fire();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for termination signals");
                }
            }
        });

        let result = self.run(config).await;

        signal_handle.abort();

        result
    }

    /// Run for a fixed duration
    ///
    /// Fires the shutdown signal once `duration` has elapsed.
    pub async fn run_with_timeout(
        &self,
        config: &LoadConfig,
        duration: Duration,
    ) -> LoadResult<StatsSnapshot> {
        let shutdown = self.shutdown.clone();

        let timeout_handle = tokio::spawn(async move {
            if !shutdown.wait(duration).await {
                tracing::info!("Run duration reached, shutting down...");
                shutdown.fire();
            }
        });

        let result = self.run(config).await;

        timeout_handle.abort();

        result
    }

    /// One-time setup for a kind
    async fn provision(
        &self,
        kind: PublisherKind,
        config: &LoadConfig,
    ) -> Result<Provisioned, ProvisionError> {
        match kind {
            PublisherKind::Plain | PublisherKind::RequestReply => Ok(Provisioned::Client),
            PublisherKind::DurableStream => {
                self.broker
                    .ensure_stream(&config.js_stream_name, &config.js_subject_prefix)
                    .await?;
                tracing::info!(stream = %config.js_stream_name, "Stream ready");
                Ok(Provisioned::Client)
            }
            PublisherKind::KeyValue => {
                let bucket = self.broker.ensure_kv_bucket(&config.kv_bucket).await?;
                tracing::info!(bucket = %config.kv_bucket, "KV bucket ready");
                Ok(Provisioned::Kv(bucket))
            }
            PublisherKind::Blob => {
                let bucket = self.broker.ensure_blob_bucket(&config.obj_bucket).await?;
                tracing::info!(bucket = %config.obj_bucket, "Object store bucket ready");
                Ok(Provisioned::Blob(bucket))
            }
        }
    }

    /// Build the send operation for one instance of `kind`
    fn send_op(
        &self,
        kind: PublisherKind,
        publisher_id: usize,
        config: &LoadConfig,
        payloads: PayloadFactory,
        provisioned: &Provisioned,
    ) -> Box<dyn SendOp> {
        let target = config.target(kind, publisher_id);
        let broker = Arc::clone(&self.broker);

        match (kind, provisioned) {
            (PublisherKind::KeyValue, Provisioned::Kv(bucket)) => {
                Box::new(KvPut::new(Arc::clone(bucket), target, payloads))
            }
            (PublisherKind::Blob, Provisioned::Blob(bucket)) => {
                Box::new(BlobPut::new(Arc::clone(bucket), target, payloads))
            }
            (PublisherKind::DurableStream, _) => {
                Box::new(DurablePublish::new(broker, target, payloads))
            }
            (PublisherKind::RequestReply, _) => Box::new(RequestReply::new(
                broker,
                target,
                config.request_timeout(),
                payloads,
            )),
            _ => Box::new(PlainPublish::new(broker, target, payloads)),
        }
    }

    /// Wait for every task, honouring the grace period if one is set
    ///
    /// Returns how many tasks were aborted after the grace period.
    async fn wait_all(&self, handles: Vec<(String, JoinHandle<u64>)>) -> usize {
        let aborts: Vec<_> = handles.iter().map(|(_, h)| h.abort_handle()).collect();
        let join = futures::future::join_all(
            handles
                .into_iter()
                .map(|(unit, handle)| async move { (unit, handle.await) }),
        );
        tokio::pin!(join);

        let results = match self.grace_period {
            None => join.await,
            Some(grace) => {
                let deadline = async {
                    self.shutdown.fired().await;
                    tokio::time::sleep(grace).await;
                };

                tokio::select! {
                    results = &mut join => results,
                    _ = deadline => {
                        tracing::warn!(
                            grace_ms = grace.as_millis() as u64,
                            "Grace period expired, aborting remaining tasks"
                        );
                        for abort in &aborts {
                            abort.abort();
                        }
                        join.await
                    }
                }
            }
        };

        let mut abandoned = 0;
        for (unit, result) in results {
            match result {
                Ok(iterations) => {
                    tracing::debug!(unit = %unit, iterations, "Task completed");
                }
                Err(e) if e.is_cancelled() => {
                    abandoned += 1;
                    tracing::warn!(unit = %unit, "Task abandoned after grace period");
                }
                Err(e) => {
                    tracing::error!(unit = %unit, error = %e, "Task panicked");
                }
            }
        }
        abandoned
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("shutdown", &self.shutdown.is_set())
            .field("grace_period", &self.grace_period)
            .field("report_sink", &self.report_sink.is_some())
            .finish()
    }
}
