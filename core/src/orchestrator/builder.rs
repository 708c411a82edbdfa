//! Builder pattern for Orchestrator construction

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{LoadError, LoadResult};
use crate::shutdown::ShutdownSignal;
use crate::stats::StatsSnapshot;
use crate::traits::BrokerClient;

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .broker(broker)
///     .shutdown(shutdown.clone())
///     .grace_period(Some(Duration::from_secs(10)))
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    broker: Option<Arc<dyn BrokerClient>>,
    shutdown: Option<ShutdownSignal>,
    grace_period: Option<Duration>,
    report_sink: Option<mpsc::Sender<StatsSnapshot>>,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder
    pub fn new() -> Self {
        Self {
            broker: None,
            shutdown: None,
            grace_period: None,
            report_sink: None,
        }
    }

    /// Set the broker client
    pub fn broker(mut self, broker: Arc<dyn BrokerClient>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Share an existing shutdown signal
    ///
    /// Without one, the orchestrator creates its own; get it back with
    /// [`Orchestrator::shutdown_signal`].
    pub fn shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Bound the wait for tasks after shutdown fires (`None` waits forever)
    pub fn grace_period(mut self, grace: Option<Duration>) -> Self {
        self.grace_period = grace;
        self
    }

    /// Forward periodic stats snapshots to a channel
    pub fn report_sink(mut self, sink: mpsc::Sender<StatsSnapshot>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the broker is not set.
    pub fn build(self) -> LoadResult<Orchestrator> {
        let broker = self
            .broker
            .ok_or(LoadError::MissingComponent("broker"))?;

        Ok(Orchestrator {
            broker,
            shutdown: self.shutdown.unwrap_or_default(),
            grace_period: self.grace_period,
            report_sink: self.report_sink,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
