//! Publisher send loop

use std::sync::Arc;
use std::time::Duration;

use crate::shutdown::ShutdownSignal;
use crate::stats::StatCounters;
use crate::traits::PublisherKind;

use super::ops::SendOp;

/// One running publisher instance: send -> count -> sleep -> repeat
///
/// The loop is identical for every kind; only the injected [`SendOp`]
/// differs. It ends only when the shutdown signal fires.
pub struct Publisher {
    /// Identity, unique within the kind
    id: usize,

    /// The one-send capability for this kind
    op: Box<dyn SendOp>,

    /// Pause between sends
    interval: Duration,

    /// Shared counters
    stats: Arc<StatCounters>,

    /// Shared cancellation
    shutdown: ShutdownSignal,

    /// Payload tag, bumped on every attempted send
    sequence: u64,
}

impl Publisher {
    /// Create a new publisher
    ///
    /// Use [`PublisherBuilder`](super::PublisherBuilder) for a more ergonomic construction.
    pub fn new(
        id: usize,
        op: Box<dyn SendOp>,
        interval: Duration,
        stats: Arc<StatCounters>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            id,
            op,
            interval,
            stats,
            shutdown,
            sequence: 0,
        }
    }

    /// Run until the shutdown signal fires
    ///
    /// A failed send is counted and the loop carries on. Returns the number
    /// of attempted sends.
    pub async fn run(mut self) -> u64 {
        let kind = self.op.kind();

        tracing::debug!(
            kind = %kind,
            publisher_id = self.id,
            target = self.op.target(),
            interval_ms = self.interval.as_millis() as u64,
            "Publisher started"
        );

        while !self.shutdown.is_set() {
            self.sequence += 1;

            match self.op.send(self.id, self.sequence).await {
                Ok(()) => {
                    self.stats.record_sent(kind);
                    tracing::debug!(
                        kind = %kind,
                        publisher_id = self.id,
                        sequence = self.sequence,
                        target = self.op.target(),
                        "Sent"
                    );
                }
                Err(e) => {
                    self.stats.record_error(kind);
                    tracing::debug!(
                        kind = %kind,
                        publisher_id = self.id,
                        sequence = self.sequence,
                        error = %e,
                        "Send failed"
                    );
                }
            }

            if self.shutdown.wait(self.interval).await {
                break;
            }
        }

        tracing::debug!(
            kind = %kind,
            publisher_id = self.id,
            attempts = self.sequence,
            "Publisher finished"
        );

        self.sequence
    }

    /// Get the publisher ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get the publisher kind
    pub fn kind(&self) -> PublisherKind {
        self.op.kind()
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("id", &self.id)
            .field("kind", &self.op.kind())
            .field("target", &self.op.target())
            .field("interval", &self.interval)
            .field("sequence", &self.sequence)
            .finish()
    }
}
