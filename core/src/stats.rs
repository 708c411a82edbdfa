//! Shared send counters
//!
//! One pair of counters (sent, errors) per [`PublisherKind`], written by
//! every publisher and read by the reporter and the final summary.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::traits::PublisherKind;

/// Which counter of a kind an increment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Send succeeded
    Sent,
    /// Send failed (including reply timeouts)
    Error,
}

#[derive(Debug, Default)]
struct KindCounters {
    sent: AtomicU64,
    errors: AtomicU64,
}

/// Concurrency-safe running totals for a run
///
/// Counters only ever grow. Each counter is a single atomic, so concurrent
/// increments are never lost and a read never tears, but a snapshot of
/// several counters is not one point-in-time cut.
#[derive(Debug)]
pub struct StatCounters {
    counters: [KindCounters; 5],
    started_at: Instant,
}

impl StatCounters {
    /// Create zeroed counters and capture the start time
    pub fn new() -> Self {
        Self {
            counters: Default::default(),
            started_at: Instant::now(),
        }
    }

    /// Add `amount` to the `outcome` counter of `kind`
    pub fn increment(&self, kind: PublisherKind, outcome: Outcome, amount: u64) {
        let counters = &self.counters[kind.index()];
        let counter = match outcome {
            Outcome::Sent => &counters.sent,
            Outcome::Error => &counters.errors,
        };
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    /// Record one successful send
    pub fn record_sent(&self, kind: PublisherKind) {
        self.increment(kind, Outcome::Sent, 1);
    }

    /// Record one failed send
    pub fn record_error(&self, kind: PublisherKind) {
        self.increment(kind, Outcome::Error, 1);
    }

    /// Current sent count for `kind`
    pub fn sent(&self, kind: PublisherKind) -> u64 {
        self.counters[kind.index()].sent.load(Ordering::Relaxed)
    }

    /// Current error count for `kind`
    pub fn errors(&self, kind: PublisherKind) -> u64 {
        self.counters[kind.index()].errors.load(Ordering::Relaxed)
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Read every counter plus elapsed time
    pub fn snapshot(&self) -> StatsSnapshot {
        let kinds = PublisherKind::ALL.map(|kind| KindSnapshot {
            kind,
            sent: self.sent(kind),
            errors: self.errors(kind),
        });

        StatsSnapshot {
            kinds,
            elapsed: self.elapsed(),
        }
    }

    /// Total sent divided by elapsed seconds, 0 when no time has passed
    pub fn rate(&self) -> f64 {
        self.snapshot().rate()
    }
}

impl Default for StatCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters of one kind at snapshot time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindSnapshot {
    /// Publisher kind
    pub kind: PublisherKind,
    /// Successful sends
    pub sent: u64,
    /// Failed sends
    pub errors: u64,
}

/// A read of all counters plus elapsed time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Per-kind counters in [`PublisherKind::ALL`] order
    pub kinds: [KindSnapshot; 5],
    /// Time since the run started
    pub elapsed: Duration,
}

impl StatsSnapshot {
    /// Counters for `kind`
    pub fn kind(&self, kind: PublisherKind) -> &KindSnapshot {
        &self.kinds[kind.index()]
    }

    /// Sum of all sent counters
    pub fn total_sent(&self) -> u64 {
        self.kinds.iter().map(|k| k.sent).sum()
    }

    /// Sum of all error counters
    pub fn total_errors(&self) -> u64 {
        self.kinds.iter().map(|k| k.errors).sum()
    }

    /// Messages per second over the elapsed time
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_sent() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Single-line form used by the periodic reporter
impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stats:")?;
        for k in &self.kinds {
            write!(f, " {}={}", k.kind.short_label(), k.sent)?;
        }
        write!(
            f,
            " | Total={} | Rate={:.1} msg/s",
            self.total_sent(),
            self.rate()
        )
    }
}
