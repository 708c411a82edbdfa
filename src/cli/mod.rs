//! CLI argument parsing and config loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use loadgen_core::LoadConfig;

#[derive(Parser, Debug)]
#[command(name = "nats-loadgen")]
#[command(author, version, long_about = None)]
#[command(about = "Spin up multiple NATS publishers for testing message ingestion")]
#[command(after_help = "Examples:
  nats-loadgen --normal 5                    # 5 normal publishers
  nats-loadgen --normal 5 --js 3             # 5 normal + 3 JetStream
  nats-loadgen --normal 10 --verbose         # 10 normal with verbose output
  nats-loadgen --config config.json          # Use config file
  nats-loadgen --generate-config > cfg.json  # Generate sample config")]
pub struct Cli {
    /// NATS server URL
    #[arg(long, default_value = "nats://localhost:4222")]
    pub url: String,

    /// Path to JSON config file (replaces the publisher flags)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    /// Number of normal (core NATS) publishers
    #[arg(long, default_value_t = 0, help_heading = "Normal Publishers (Core NATS)")]
    pub normal: usize,

    /// Subject prefix
    #[arg(long, default_value = "test.normal", help_heading = "Normal Publishers (Core NATS)")]
    pub normal_subject: String,

    /// Publish interval in ms
    #[arg(long, default_value_t = 1000, help_heading = "Normal Publishers (Core NATS)")]
    pub normal_interval: u64,

    /// Number of JetStream publishers
    #[arg(long, default_value_t = 0, help_heading = "JetStream Publishers")]
    pub js: usize,

    /// Subject prefix
    #[arg(long, default_value = "test.js", help_heading = "JetStream Publishers")]
    pub js_subject: String,

    /// Stream name
    #[arg(long, default_value = "TEST", help_heading = "JetStream Publishers")]
    pub js_stream: String,

    /// Publish interval in ms
    #[arg(long, default_value_t = 1000, help_heading = "JetStream Publishers")]
    pub js_interval: u64,

    /// Number of request-reply publishers
    #[arg(long, default_value_t = 0, help_heading = "Request-Reply Publishers")]
    pub reqrep: usize,

    /// Subject prefix
    #[arg(long, default_value = "test.service", help_heading = "Request-Reply Publishers")]
    pub reqrep_subject: String,

    /// Request interval in ms
    #[arg(long, default_value_t = 2000, help_heading = "Request-Reply Publishers")]
    pub reqrep_interval: u64,

    /// Request timeout in ms
    #[arg(long, default_value_t = 5000, help_heading = "Request-Reply Publishers")]
    pub reqrep_timeout: u64,

    /// Number of KV publishers
    #[arg(long, default_value_t = 0, help_heading = "Key-Value Publishers")]
    pub kv: usize,

    /// KV bucket name
    #[arg(long, default_value = "test-bucket", help_heading = "Key-Value Publishers")]
    pub kv_bucket: String,

    /// Key prefix
    #[arg(long, default_value = "test-key", help_heading = "Key-Value Publishers")]
    pub kv_key: String,

    /// Put interval in ms
    #[arg(long, default_value_t = 1500, help_heading = "Key-Value Publishers")]
    pub kv_interval: u64,

    /// Number of Object Store publishers
    #[arg(long, default_value_t = 0, help_heading = "Object Store Publishers")]
    pub obj: usize,

    /// Object Store bucket
    #[arg(long, default_value = "test-objects", help_heading = "Object Store Publishers")]
    pub obj_bucket: String,

    /// Object name prefix
    #[arg(long, default_value = "test-obj", help_heading = "Object Store Publishers")]
    pub obj_name: String,

    /// Put interval in ms
    #[arg(long, default_value_t = 5000, help_heading = "Object Store Publishers")]
    pub obj_interval: u64,

    /// Object size in bytes
    #[arg(long, default_value_t = 1024, help_heading = "Object Store Publishers")]
    pub obj_size: usize,

    /// Message payload size in bytes
    #[arg(long, default_value_t = 128, help_heading = "Message Options")]
    pub msg_size: usize,

    /// Enable verbose logging
    #[arg(short, long, help_heading = "Output Options")]
    pub verbose: bool,

    /// Stats reporting interval in seconds (0 to disable)
    #[arg(long, default_value_t = 5, help_heading = "Output Options")]
    pub stats_interval: u64,

    /// Stop after this many seconds instead of waiting for a signal
    #[arg(long, help_heading = "Shutdown")]
    pub duration: Option<u64>,

    /// Abandon tasks still running this many ms after shutdown
    #[arg(long, help_heading = "Shutdown")]
    pub grace_period_ms: Option<u64>,

    /// Generate a sample config file and exit
    #[arg(long)]
    pub generate_config: bool,
}

impl Cli {
    /// Resolve the run configuration from the config file or the flags
    pub fn load_config(&self) -> Result<LoadConfig> {
        let mut config = match &self.config_file {
            Some(path) => load_config_file(path)?,
            None => self.flags_config(),
        };
        config.verbose |= self.verbose;
        Ok(config)
    }

    /// Configuration built from command-line flags only
    pub fn flags_config(&self) -> LoadConfig {
        LoadConfig {
            nats_url: self.url.clone(),
            normal_publishers: self.normal,
            normal_subject_prefix: self.normal_subject.clone(),
            normal_interval_ms: self.normal_interval,
            js_publishers: self.js,
            js_subject_prefix: self.js_subject.clone(),
            js_stream_name: self.js_stream.clone(),
            js_interval_ms: self.js_interval,
            reqrep_publishers: self.reqrep,
            reqrep_subject_prefix: self.reqrep_subject.clone(),
            reqrep_interval_ms: self.reqrep_interval,
            reqrep_timeout_ms: self.reqrep_timeout,
            kv_publishers: self.kv,
            kv_bucket: self.kv_bucket.clone(),
            kv_key_prefix: self.kv_key.clone(),
            kv_interval_ms: self.kv_interval,
            obj_publishers: self.obj,
            obj_bucket: self.obj_bucket.clone(),
            obj_name_prefix: self.obj_name.clone(),
            obj_interval_ms: self.obj_interval,
            obj_size_bytes: self.obj_size,
            message_size_bytes: self.msg_size,
            verbose: self.verbose,
            stats_interval_sec: self.stats_interval,
            ..Default::default()
        }
    }

    /// Fixed run duration, if requested
    pub fn run_duration(&self) -> Option<Duration> {
        self.duration.map(Duration::from_secs)
    }

    /// Post-shutdown grace period, if requested
    pub fn grace_period(&self) -> Option<Duration> {
        self.grace_period_ms.map(Duration::from_millis)
    }
}

/// Log filter used when `RUST_LOG` is unset
///
/// Verbose raises only this tool's own targets, so dependencies stay at info.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,nats_loadgen=debug,loadgen_core=debug,loadgen_nats=debug"
    } else {
        "info"
    }
}

/// Load a JSON config file
pub fn load_config_file(path: &Path) -> Result<LoadConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))
}

/// Pretty JSON of the sample configuration
pub fn sample_config_json() -> Result<String> {
    serde_json::to_string_pretty(&LoadConfig::sample()).context("failed to encode sample config")
}
