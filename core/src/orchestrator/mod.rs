//! Orchestrator for run lifecycle management
//!
//! The Orchestrator coordinates a complete load run:
//! - Provisioning broker resources once per kind
//! - Spawning one task per publisher instance plus the stats reporter
//! - Propagating the shared shutdown signal
//! - Waiting for every task to unwind before the final snapshot
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::{final_summary, OrchestratorBuilder};
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .broker(broker)
//!     .shutdown(shutdown.clone())
//!     .build()?;
//!
//! let stats = orchestrator.run_with_signal_handling(&config).await?;
//! println!("{}", final_summary(&stats));
//! ```

mod builder;
mod executor;
mod summary;

pub use builder::OrchestratorBuilder;
pub use executor::Orchestrator;
pub use summary::final_summary;
