//! Periodic stats reporting

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::shutdown::ShutdownSignal;
use crate::stats::{StatCounters, StatsSnapshot};

/// Emits a counters snapshot every `interval` until shutdown
///
/// Nothing is emitted on the way out; the final summary is produced once
/// by the caller after every unit has returned.
pub struct StatsReporter {
    stats: Arc<StatCounters>,
    interval: Duration,
    shutdown: ShutdownSignal,
    sink: Option<mpsc::Sender<StatsSnapshot>>,
}

impl StatsReporter {
    /// Create a reporter
    pub fn new(stats: Arc<StatCounters>, interval: Duration, shutdown: ShutdownSignal) -> Self {
        Self {
            stats,
            interval,
            shutdown,
            sink: None,
        }
    }

    /// Also forward every snapshot to `sink`
    ///
    /// A full or closed channel drops the snapshot; the log line is still
    /// written.
    pub fn with_sink(mut self, sink: mpsc::Sender<StatsSnapshot>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run until the shutdown signal fires, returning the number of reports
    pub async fn run(self) -> usize {
        let mut reports = 0;

        while !self.shutdown.wait(self.interval).await {
            let snapshot = self.stats.snapshot();
            tracing::info!(
                total_sent = snapshot.total_sent(),
                total_errors = snapshot.total_errors(),
                "{snapshot}"
            );

            if let Some(sink) = &self.sink {
                if sink.try_send(snapshot).is_err() {
                    tracing::debug!("Stats sink unavailable, snapshot dropped");
                }
            }
            reports += 1;
        }

        tracing::debug!(reports, "Stats reporter finished");
        reports
    }
}

impl std::fmt::Debug for StatsReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsReporter")
            .field("interval", &self.interval)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PublisherKind;

    #[tokio::test(start_paused = true)]
    async fn test_reports_on_each_interval() {
        let stats = Arc::new(StatCounters::new());
        let shutdown = ShutdownSignal::new();
        let (tx, mut rx) = mpsc::channel(16);

        let reporter =
            StatsReporter::new(Arc::clone(&stats), Duration::from_secs(1), shutdown.clone())
                .with_sink(tx);
        let handle = tokio::spawn(reporter.run());

        stats.record_sent(PublisherKind::Plain);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        stats.record_sent(PublisherKind::KeyValue);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        shutdown.fire();

        assert_eq!(handle.await.unwrap(), 2);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.total_sent(), 1);
        assert_eq!(first.elapsed, Duration::from_secs(1));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.total_sent(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_report_when_fired_before_first_interval() {
        let shutdown = ShutdownSignal::new();
        let (tx, mut rx) = mpsc::channel(4);
        let reporter = StatsReporter::new(
            Arc::new(StatCounters::new()),
            Duration::from_secs(5),
            shutdown.clone(),
        )
        .with_sink(tx);

        let handle = tokio::spawn(reporter.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.fire();

        assert_eq!(handle.await.unwrap(), 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_sink_does_not_stop_reporter() {
        let shutdown = ShutdownSignal::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let reporter = StatsReporter::new(
            Arc::new(StatCounters::new()),
            Duration::from_millis(100),
            shutdown.clone(),
        )
        .with_sink(tx);

        let handle = tokio::spawn(reporter.run());
        tokio::time::sleep(Duration::from_millis(350)).await;
        shutdown.fire();

        assert_eq!(handle.await.unwrap(), 3);
    }
}
