//! Load generation configuration
//!
//! The JSON shape is flat so that config files written by
//! `--generate-config` can be edited by hand and loaded back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::traits::PublisherKind;

/// Load generation configuration
///
/// Built once by the CLI layer and treated as read-only by the core.
/// Every field has a default, so partial JSON files are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Broker URL
    pub nats_url: String,

    /// Number of plain publishers
    pub normal_publishers: usize,
    /// Subject prefix for plain publishers
    pub normal_subject_prefix: String,
    /// Plain publish interval
    pub normal_interval_ms: u64,

    /// Number of JetStream publishers
    pub js_publishers: usize,
    /// Subject prefix for JetStream publishers
    pub js_subject_prefix: String,
    /// Stream that captures the JetStream subjects
    pub js_stream_name: String,
    /// JetStream publish interval
    pub js_interval_ms: u64,

    /// Number of request-reply publishers
    pub reqrep_publishers: usize,
    /// Subject prefix for request-reply publishers
    pub reqrep_subject_prefix: String,
    /// Request interval
    pub reqrep_interval_ms: u64,
    /// Reply timeout
    pub reqrep_timeout_ms: u64,

    /// Number of key-value publishers
    pub kv_publishers: usize,
    /// Key-value bucket
    pub kv_bucket: String,
    /// Key prefix
    pub kv_key_prefix: String,
    /// Put interval
    pub kv_interval_ms: u64,

    /// Number of object store publishers
    pub obj_publishers: usize,
    /// Object store bucket
    pub obj_bucket: String,
    /// Object name prefix
    pub obj_name_prefix: String,
    /// Put interval
    pub obj_interval_ms: u64,
    /// Size of each stored object
    pub obj_size_bytes: usize,

    /// Length of the random `data` field in JSON payloads
    pub message_size_bytes: usize,
    /// Add an RFC3339 `timestamp` field to JSON payloads
    pub include_timestamp: bool,
    /// Add the per-publisher `sequence` field to JSON payloads
    pub include_sequence: bool,

    /// Log every send
    pub verbose: bool,
    /// Periodic stats cadence, 0 disables the reporter
    pub stats_interval_sec: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".into(),

            normal_publishers: 0,
            normal_subject_prefix: "test.normal".into(),
            normal_interval_ms: 1000,

            js_publishers: 0,
            js_subject_prefix: "test.js".into(),
            js_stream_name: "TEST".into(),
            js_interval_ms: 1000,

            reqrep_publishers: 0,
            reqrep_subject_prefix: "test.service".into(),
            reqrep_interval_ms: 2000,
            reqrep_timeout_ms: 5000,

            kv_publishers: 0,
            kv_bucket: "test-bucket".into(),
            kv_key_prefix: "test-key".into(),
            kv_interval_ms: 1500,

            obj_publishers: 0,
            obj_bucket: "test-objects".into(),
            obj_name_prefix: "test-obj".into(),
            obj_interval_ms: 5000,
            obj_size_bytes: 1024,

            message_size_bytes: 128,
            include_timestamp: true,
            include_sequence: true,

            verbose: false,
            stats_interval_sec: 5,
        }
    }
}

impl LoadConfig {
    /// Example configuration printed by `--generate-config`
    pub fn sample() -> Self {
        Self {
            normal_publishers: 5,
            js_publishers: 3,
            reqrep_publishers: 2,
            kv_publishers: 2,
            obj_publishers: 1,
            ..Default::default()
        }
    }

    /// Requested instance count for `kind`
    pub fn instances(&self, kind: PublisherKind) -> usize {
        match kind {
            PublisherKind::Plain => self.normal_publishers,
            PublisherKind::DurableStream => self.js_publishers,
            PublisherKind::RequestReply => self.reqrep_publishers,
            PublisherKind::KeyValue => self.kv_publishers,
            PublisherKind::Blob => self.obj_publishers,
        }
    }

    /// Send interval for `kind`
    pub fn interval(&self, kind: PublisherKind) -> Duration {
        let ms = match kind {
            PublisherKind::Plain => self.normal_interval_ms,
            PublisherKind::DurableStream => self.js_interval_ms,
            PublisherKind::RequestReply => self.reqrep_interval_ms,
            PublisherKind::KeyValue => self.kv_interval_ms,
            PublisherKind::Blob => self.obj_interval_ms,
        };
        Duration::from_millis(ms)
    }

    /// Naming prefix (subject, key or object name) for `kind`
    pub fn prefix(&self, kind: PublisherKind) -> &str {
        match kind {
            PublisherKind::Plain => &self.normal_subject_prefix,
            PublisherKind::DurableStream => &self.js_subject_prefix,
            PublisherKind::RequestReply => &self.reqrep_subject_prefix,
            PublisherKind::KeyValue => &self.kv_key_prefix,
            PublisherKind::Blob => &self.obj_name_prefix,
        }
    }

    /// Target a given instance sends to
    ///
    /// Subjects are dot-separated, keys and object names dash-separated.
    pub fn target(&self, kind: PublisherKind, publisher_id: usize) -> String {
        let prefix = self.prefix(kind);
        match kind {
            PublisherKind::KeyValue | PublisherKind::Blob => format!("{prefix}-{publisher_id}"),
            _ => format!("{prefix}.{publisher_id}"),
        }
    }

    /// Reply timeout for request-reply publishers
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.reqrep_timeout_ms)
    }

    /// Periodic report cadence, `None` when disabled
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_sec > 0).then(|| Duration::from_secs(self.stats_interval_sec))
    }

    /// Sum of instance counts across all kinds
    pub fn total_publishers(&self) -> usize {
        PublisherKind::ALL.iter().map(|k| self.instances(*k)).sum()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_publishers() == 0 {
            return Err(ConfigError::NoPublishers);
        }

        for kind in PublisherKind::ALL {
            if self.instances(kind) > 0 && self.interval(kind).is_zero() {
                return Err(ConfigError::ZeroInterval { kind });
            }
        }

        if self.reqrep_publishers > 0 && self.reqrep_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoadConfig::default();
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.total_publishers(), 0);
        assert_eq!(config.interval(PublisherKind::KeyValue), Duration::from_millis(1500));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.stats_interval(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_sample_config_totals() {
        let config = LoadConfig::sample();
        assert_eq!(config.total_publishers(), 13);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_no_publishers() {
        assert_eq!(LoadConfig::default().validate(), Err(ConfigError::NoPublishers));
    }

    #[test]
    fn test_validation_zero_interval() {
        let config = LoadConfig {
            kv_publishers: 1,
            kv_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval {
                kind: PublisherKind::KeyValue
            })
        );
    }

    #[test]
    fn test_zero_interval_ignored_for_unused_kind() {
        let config = LoadConfig {
            normal_publishers: 1,
            obj_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = LoadConfig {
            reqrep_publishers: 1,
            reqrep_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_targets() {
        let config = LoadConfig::default();
        assert_eq!(config.target(PublisherKind::Plain, 3), "test.normal.3");
        assert_eq!(config.target(PublisherKind::DurableStream, 0), "test.js.0");
        assert_eq!(config.target(PublisherKind::RequestReply, 1), "test.service.1");
        assert_eq!(config.target(PublisherKind::KeyValue, 2), "test-key-2");
        assert_eq!(config.target(PublisherKind::Blob, 0), "test-obj-0");
    }

    #[test]
    fn test_stats_interval_disabled() {
        let config = LoadConfig {
            stats_interval_sec: 0,
            ..Default::default()
        };
        assert!(config.stats_interval().is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoadConfig =
            serde_json::from_str(r#"{"normal_publishers": 4, "js_stream_name": "LOAD"}"#).unwrap();
        assert_eq!(config.normal_publishers, 4);
        assert_eq!(config.js_stream_name, "LOAD");
        assert_eq!(config.normal_interval_ms, 1000);
        assert!(config.include_sequence);
    }

    #[test]
    fn test_config_serialization() {
        let config = LoadConfig::sample();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"obj_size_bytes\": 1024"));

        let deserialized: LoadConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
