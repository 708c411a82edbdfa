//! Error types for loadgen-core

use std::time::Duration;

use thiserror::Error;

use crate::traits::PublisherKind;

/// Configuration validation errors
///
/// These are fatal and raised before any publisher is launched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Every publisher count is zero
    #[error("no publishers configured; request at least one publisher of any kind")]
    NoPublishers,

    /// A kind with instances has a zero send interval
    #[error("{kind} publishers need a send interval greater than zero")]
    ZeroInterval {
        /// Offending publisher kind
        kind: PublisherKind,
    },

    /// Request-reply publishers with a zero reply timeout
    #[error("request-reply publishers need a timeout greater than zero")]
    ZeroTimeout,
}

/// One-time setup failure for a publisher kind
///
/// Recoverable: the kind is skipped and the rest of the run proceeds.
#[derive(Error, Debug, Clone)]
#[error("could not provision {resource} for {kind} publishers: {reason}")]
pub struct ProvisionError {
    /// Kind whose setup failed
    pub kind: PublisherKind,
    /// Stream or bucket name
    pub resource: String,
    /// Broker-supplied reason
    pub reason: String,
}

impl ProvisionError {
    /// Create a provisioning error
    pub fn new(
        kind: PublisherKind,
        resource: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self {
            kind,
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure of a single send attempt
///
/// Counted against the kind's error counter; never stops a publisher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Request-reply got no answer within its timeout
    #[error("request timed out after {0:?} (no responder?)")]
    Timeout(Duration),

    /// The broker reported that nobody listens on the subject
    #[error("no responders on subject")]
    NoResponders,

    /// Payload could not be encoded
    #[error("payload encoding failed: {0}")]
    Encode(String),

    /// Any other broker-side failure
    #[error("broker error: {0}")]
    Broker(String),
}

impl SendError {
    /// Wrap a broker client error
    pub fn broker(err: impl ToString) -> Self {
        SendError::Broker(err.to_string())
    }
}

impl From<serde_json::Error> for SendError {
    fn from(err: serde_json::Error) -> Self {
        SendError::Encode(err.to_string())
    }
}

/// Core error type
#[derive(Error, Debug)]
pub enum LoadError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required builder component was not supplied
    #[error("missing required component: {0}")]
    MissingComponent(&'static str),

    /// Provisioning failed for every configured kind
    #[error("no publishers could be started ({skipped} kind(s) failed provisioning)")]
    NoPublishersStarted {
        /// How many kinds were skipped
        skipped: usize,
    },
}

/// Result type alias
pub type LoadResult<T> = std::result::Result<T, LoadError>;
