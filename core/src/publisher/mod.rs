//! Publisher module: the long-lived send loops
//!
//! A [`Publisher`] is one tokio task running the loop
//! **send -> count -> sleep -> repeat** until the shared
//! [`ShutdownSignal`](crate::ShutdownSignal) fires:
//!
//! 1. Bump its private sequence number
//! 2. Perform one send through its [`SendOp`] (publish, durable publish,
//!    request, KV put or object put)
//! 3. Bump the kind's `sent` or `errors` counter
//! 4. Sleep for the interval, waking early on shutdown
//!
//! A failed send never ends the loop; only shutdown does.
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::publisher::{PlainPublish, PublisherBuilder};
//!
//! let publisher = PublisherBuilder::new(0)
//!     .op(Box::new(PlainPublish::new(broker, "test.normal.0".into(), payloads)))
//!     .interval(Duration::from_millis(500))
//!     .stats(Arc::clone(&stats))
//!     .shutdown(shutdown.clone())
//!     .build()?;
//!
//! let attempts = publisher.run().await;
//! ```

mod builder;
mod executor;
mod ops;

pub use builder::PublisherBuilder;
pub use executor::Publisher;
pub use ops::{BlobPut, DurablePublish, KvPut, PlainPublish, RequestReply, SendOp};
