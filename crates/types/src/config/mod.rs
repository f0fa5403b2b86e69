// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the registries and the CLI.
use serde::{Deserialize, Serialize};

/// Top-level configuration, usually loaded from `qgov.toml`.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Bounds on identifiers and free text.
    #[serde(default)]
    pub limits: TextLimits,
    /// Voting window rules.
    #[serde(default)]
    pub voting: VotingParams,
    /// The host clock.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Length bounds for bounded text fields.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TextLimits {
    /// The maximum length of identifiers and state labels.
    #[serde(default = "default_max_id_len")]
    pub max_id_len: usize,
    /// The maximum length of descriptions, justifications and comments.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
}

fn default_max_id_len() -> usize {
    64
}
fn default_max_text_len() -> usize {
    256
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_id_len: default_max_id_len(),
            max_text_len: default_max_text_len(),
        }
    }
}

/// Configuration parameters for proposal voting windows.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct VotingParams {
    /// The shortest accepted voting duration in blocks. Values below 1 are treated as 1.
    #[serde(default = "default_min_voting_period")]
    pub min_voting_period_blocks: u64,
    /// The longest accepted voting duration in blocks, if bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_voting_period_blocks: Option<u64>,
}

fn default_min_voting_period() -> u64 {
    1
}

impl Default for VotingParams {
    fn default() -> Self {
        Self {
            min_voting_period_blocks: default_min_voting_period(),
            max_voting_period_blocks: None,
        }
    }
}

/// The starting point of the host's height counter.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockConfig {
    /// The height reported before any block is advanced.
    #[serde(default)]
    pub start_height: u64,
}

/// Output format of the log subscriber.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Compact human-readable lines.
    Pretty,
}

/// Logging and metrics settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Log line format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Whether to install the Prometheus metrics sink.
    #[serde(default)]
    pub metrics: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
            metrics: false,
        }
    }
}
