use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_MAX_FRAME_BYTES;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub events_out: EventsOutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Worker deadline in seconds; 0 disables it.
    #[serde(default)]
    pub timeout_secs: f64,

    /// How long to keep draining after the worker was killed.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,
}

fn default_kill_grace_ms() -> u64 {
    500
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 0.0,
            kill_grace_ms: default_kill_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Run-wide cap on captured values across all lines; 0 = unbounded.
    #[serde(default)]
    pub total_capture_limit: u64,
}

impl CaptureConfig {
    pub fn limit(&self) -> Option<u64> {
        (self.total_capture_limit > 0).then_some(self.total_capture_limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_width")]
    pub width: usize,

    #[serde(default = "default_block_max_lines")]
    pub block_max_lines: usize,
}

fn default_width() -> usize {
    100
}

fn default_block_max_lines() -> usize {
    20
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width: default_width(),
            block_max_lines: default_block_max_lines(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventsOutFormat {
    /// Same frames the worker wrote.
    #[default]
    Binary,
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsOutConfig {
    #[serde(default)]
    pub enabled: bool,

    /// File path, or `stdout:` for the supervisor's own stdout.
    #[serde(default = "default_events_out_path")]
    pub path: String,

    #[serde(default)]
    pub format: EventsOutFormat,
}

fn default_events_out_path() -> String {
    "stdout:".to_string()
}

impl Default for EventsOutConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_events_out_path(),
            format: EventsOutFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for `linetrace.log`; empty logs to stderr.
    #[serde(default)]
    pub directory: String,
}
