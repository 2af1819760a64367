use std::collections::BTreeMap;

use serde::Serialize;

use crate::event::interchange::payload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionRecord {
    pub line_number: u64,
    pub class_name: String,
    pub message: String,
    pub backtrace: Vec<String>,
}

/// One entry in a line's record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineRecord {
    Value {
        result_kind: String,
        inspected: String,
    },
    /// The per-line (or run-wide) capture cap was hit on this line.
    Truncated,
    Exception(ExceptionRecord),
}

impl LineRecord {
    pub fn is_value(&self) -> bool {
        matches!(self, LineRecord::Value { .. })
    }

    /// The inspected text of a value record.
    pub fn inspected(&self) -> Option<&str> {
        match self {
            LineRecord::Value { inspected, .. } => Some(inspected),
            _ => None,
        }
    }
}

/// Everything reconstructed from one worker run.
///
/// Only [`ResultBuilder`](super::ResultBuilder) mutates it; consumers get a
/// read-only view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub(crate) lines: BTreeMap<u64, Vec<LineRecord>>,
    #[serde(serialize_with = "payload::serialize")]
    pub(crate) stdout: Vec<u8>,
    #[serde(serialize_with = "payload::serialize")]
    pub(crate) stderr: Vec<u8>,
    pub(crate) exitstatus: Option<i32>,
    pub(crate) timeout_seconds: Option<f64>,
    pub(crate) max_line_captures: Option<u64>,
    pub(crate) num_lines: Option<u64>,
    pub(crate) tool_version: Option<String>,
    pub(crate) worker_runtime_version: Option<String>,
    pub(crate) filename: Option<String>,
    pub(crate) finished: bool,
}

impl RunResult {
    /// Records for `line_number` in arrival order; empty if nothing was captured.
    pub fn line(&self, line_number: u64) -> &[LineRecord] {
        self.lines
            .get(&line_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lines that have at least one record, in ascending line order.
    pub fn lines(&self) -> impl Iterator<Item = (u64, &[LineRecord])> {
        self.lines.iter().map(|(n, recs)| (*n, recs.as_slice()))
    }

    pub fn exceptions(&self) -> impl Iterator<Item = &ExceptionRecord> {
        self.lines.values().flatten().filter_map(|rec| match rec {
            LineRecord::Exception(e) => Some(e),
            _ => None,
        })
    }

    pub fn has_exception(&self) -> bool {
        self.exceptions().next().is_some()
    }

    pub fn total_captures(&self) -> usize {
        self.lines.values().flatten().filter(|r| r.is_value()).count()
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    pub fn has_stdout(&self) -> bool {
        !self.stdout.is_empty()
    }

    pub fn has_stderr(&self) -> bool {
        !self.stderr.is_empty()
    }

    pub fn exitstatus(&self) -> Option<i32> {
        self.exitstatus
    }

    pub fn timeout_seconds(&self) -> Option<f64> {
        self.timeout_seconds
    }

    pub fn timed_out(&self) -> bool {
        self.timeout_seconds.is_some()
    }

    pub fn max_line_captures(&self) -> Option<u64> {
        self.max_line_captures
    }

    pub fn num_lines(&self) -> Option<u64> {
        self.num_lines
    }

    pub fn tool_version(&self) -> Option<&str> {
        self.tool_version.as_deref()
    }

    pub fn worker_runtime_version(&self) -> Option<&str> {
        self.worker_runtime_version.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// True once a `Finished` event was applied. A result that closed without
    /// it (worker crash, truncated stream) is partial.
    pub fn is_complete(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_line_is_empty() {
        let result = RunResult::default();
        assert!(result.line(42).is_empty());
        assert!(!result.has_exception());
        assert!(!result.is_complete());
    }

    #[test]
    fn serializes_records_with_type_tag() {
        let mut result = RunResult::default();
        result.lines.insert(
            2,
            vec![
                LineRecord::Value {
                    result_kind: "value".into(),
                    inspected: "1".into(),
                },
                LineRecord::Truncated,
            ],
        );
        result.stdout = vec![0xFF];
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["lines"]["2"][0]["type"], "value");
        assert_eq!(json["lines"]["2"][1]["type"], "truncated");
        assert_eq!(json["stdout"]["base64"], "/w==");
        assert_eq!(json["exitstatus"], serde_json::Value::Null);
    }
}
