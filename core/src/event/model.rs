use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

use super::interchange::payload;
use super::EventKind;

/// One unit of the worker's execution trace.
///
/// The set of variants is closed. Every consumer matches exhaustively, so a
/// new kind shows up as a compile error at each dispatch site instead of a
/// silently ignored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    LineResult {
        line_number: u64,
        result_kind: String,
        inspected: String,
    },
    ResultsTruncated {
        line_number: u64,
    },
    Exception {
        line_number: u64,
        class_name: String,
        message: String,
        #[serde(default)]
        backtrace: Vec<String>,
    },
    Stdout {
        #[serde(with = "payload")]
        value: Vec<u8>,
    },
    Stderr {
        #[serde(with = "payload")]
        value: Vec<u8>,
    },
    MaxLineCaptures {
        value: u64,
    },
    Exitstatus {
        value: i32,
    },
    NumLines {
        value: u64,
    },
    ToolVersion {
        value: String,
    },
    WorkerRuntimeVersion {
        value: String,
    },
    Filename {
        value: String,
    },
    Timeout {
        seconds: f64,
    },
    Exec,
    Finished,
    StdoutClosed,
    StderrClosed,
    EventStreamClosed,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::LineResult { .. } => EventKind::LineResult,
            Event::ResultsTruncated { .. } => EventKind::ResultsTruncated,
            Event::Exception { .. } => EventKind::Exception,
            Event::Stdout { .. } => EventKind::Stdout,
            Event::Stderr { .. } => EventKind::Stderr,
            Event::MaxLineCaptures { .. } => EventKind::MaxLineCaptures,
            Event::Exitstatus { .. } => EventKind::Exitstatus,
            Event::NumLines { .. } => EventKind::NumLines,
            Event::ToolVersion { .. } => EventKind::ToolVersion,
            Event::WorkerRuntimeVersion { .. } => EventKind::WorkerRuntimeVersion,
            Event::Filename { .. } => EventKind::Filename,
            Event::Timeout { .. } => EventKind::Timeout,
            Event::Exec => EventKind::Exec,
            Event::Finished => EventKind::Finished,
            Event::StdoutClosed => EventKind::StdoutClosed,
            Event::StderrClosed => EventKind::StderrClosed,
            Event::EventStreamClosed => EventKind::EventStreamClosed,
        }
    }

    pub fn line_result(
        line_number: u64,
        result_kind: impl Into<String>,
        inspected: impl Into<String>,
    ) -> Self {
        Event::LineResult {
            line_number,
            result_kind: result_kind.into(),
            inspected: inspected.into(),
        }
    }

    pub fn exception(
        line_number: u64,
        class_name: impl Into<String>,
        message: impl Into<String>,
        backtrace: Vec<String>,
    ) -> Self {
        Event::Exception {
            line_number,
            class_name: class_name.into(),
            message: message.into(),
            backtrace,
        }
    }

    pub fn stdout(value: impl Into<Vec<u8>>) -> Self {
        Event::Stdout {
            value: value.into(),
        }
    }

    pub fn stderr(value: impl Into<Vec<u8>>) -> Self {
        Event::Stderr {
            value: value.into(),
        }
    }

    /// Check field ranges the wire format cannot express: line numbers are
    /// 1-based and `Timeout.seconds` is a finite, non-negative number.
    ///
    /// Every encoder and decoder runs this, so the binary and JSON forms
    /// accept exactly the same events.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.line_number() == Some(0) {
            return Err(ProtocolError::malformed(
                self.kind(),
                "line_number must be positive",
            ));
        }
        if let Event::Timeout { seconds } = self {
            if !(seconds.is_finite() && *seconds >= 0.0) {
                return Err(ProtocolError::malformed(
                    self.kind(),
                    format!("seconds must be a non-negative number, got {seconds}"),
                ));
            }
        }
        Ok(())
    }

    /// Line number the event is attributed to, if any.
    pub fn line_number(&self) -> Option<u64> {
        match self {
            Event::LineResult { line_number, .. }
            | Event::ResultsTruncated { line_number }
            | Event::Exception { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}
