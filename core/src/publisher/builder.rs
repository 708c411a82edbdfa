//! Builder pattern for Publisher construction

use std::sync::Arc;
use std::time::Duration;

use crate::error::{LoadError, LoadResult};
use crate::shutdown::ShutdownSignal;
use crate::stats::StatCounters;

use super::executor::Publisher;
use super::ops::SendOp;

/// Builder for creating Publisher instances
///
/// # Example
/// ```ignore
/// let publisher = PublisherBuilder::new(0)
///     .op(Box::new(PlainPublish::new(broker, "test.normal.0".into(), payloads)))
///     .interval(Duration::from_millis(100))
///     .stats(stats)
///     .shutdown(shutdown)
///     .build()?;
/// ```
pub struct PublisherBuilder {
    id: usize,
    op: Option<Box<dyn SendOp>>,
    interval: Option<Duration>,
    stats: Option<Arc<StatCounters>>,
    shutdown: Option<ShutdownSignal>,
}

impl PublisherBuilder {
    /// Create a new builder with the given publisher ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            op: None,
            interval: None,
            stats: None,
            shutdown: None,
        }
    }

    /// Set the send operation
    pub fn op(mut self, op: Box<dyn SendOp>) -> Self {
        self.op = Some(op);
        self
    }

    /// Set the pause between sends
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the shared counters
    pub fn stats(mut self, stats: Arc<StatCounters>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Set the shutdown signal
    pub fn shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Build the Publisher
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> LoadResult<Publisher> {
        let op = self.op.ok_or(LoadError::MissingComponent("op"))?;
        let interval = self.interval.ok_or(LoadError::MissingComponent("interval"))?;
        let stats = self.stats.ok_or(LoadError::MissingComponent("stats"))?;
        let shutdown = self
            .shutdown
            .ok_or(LoadError::MissingComponent("shutdown"))?;

        Ok(Publisher::new(self.id, op, interval, stats, shutdown))
    }
}
