//! loadgen-core: publisher orchestration and aggregated statistics
//!
//! This crate runs any number of long-lived publisher tasks of different
//! kinds against a broker, stops them together on one shutdown signal and
//! aggregates their counters into periodic and final reports:
//!
//! - Configuration ([`LoadConfig`])
//! - The broker seam ([`BrokerClient`], [`KvBucket`], [`BlobBucket`])
//! - Publishers (one send loop parameterized by a [`SendOp`])
//! - Shared counters and snapshots ([`StatCounters`], [`StatsSnapshot`])
//! - Lifecycle ([`Orchestrator`], [`ShutdownSignal`], [`StatsReporter`])
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod publisher;
pub mod reporter;
pub mod shutdown;
pub mod signals;
pub mod stats;
pub mod traits;

#[cfg(test)]
mod mock;

pub use config::LoadConfig;
pub use error::*;
pub use orchestrator::{final_summary, Orchestrator, OrchestratorBuilder};
pub use payload::PayloadFactory;
pub use publisher::{Publisher, PublisherBuilder, SendOp};
pub use reporter::StatsReporter;
pub use shutdown::ShutdownSignal;
pub use stats::{KindSnapshot, Outcome, StatCounters, StatsSnapshot};
pub use traits::*;
