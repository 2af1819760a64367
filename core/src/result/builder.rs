use std::collections::BTreeSet;

use crate::error::HandlerError;
use crate::event::Event;
use crate::handler::Handler;

use super::types::{ExceptionRecord, LineRecord, RunResult};

/// Terminal handler that folds the event stream into a [`RunResult`].
///
/// The result is finalized by a `Finished` event or by [`ResultBuilder::finish`]
/// (stream closed), whichever comes first. Events arriving after that are
/// logged and dropped.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    result: RunResult,
    finalized: bool,
    // Run-wide cap on captured values; `None` means unbounded.
    total_capture_limit: Option<u64>,
    captured: u64,
    capped_lines: BTreeSet<u64>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of `LineResult` values kept across the whole run.
    ///
    /// Values past the budget become one truncation marker per affected line.
    /// This is independent of the worker's own per-line cap.
    pub fn with_total_capture_limit(mut self, limit: Option<u64>) -> Self {
        self.total_capture_limit = limit;
        self
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Close the aggregate (stream ended) and hand it out.
    pub fn finish(mut self) -> RunResult {
        if !self.result.finished {
            tracing::debug!(
                target: "linetrace.result",
                "stream closed before Finished; result is partial"
            );
        }
        self.finalized = true;
        self.result
    }

    fn push(&mut self, line_number: u64, record: LineRecord) {
        self.result
            .lines
            .entry(line_number)
            .or_default()
            .push(record);
    }

    fn over_budget(&self) -> bool {
        self.total_capture_limit
            .is_some_and(|limit| self.captured >= limit)
    }

    fn apply(&mut self, ev: &Event) {
        match ev {
            Event::LineResult {
                line_number,
                result_kind,
                inspected,
            } => {
                if self.over_budget() {
                    if self.capped_lines.insert(*line_number) {
                        self.push(*line_number, LineRecord::Truncated);
                    }
                    return;
                }
                self.captured += 1;
                self.push(
                    *line_number,
                    LineRecord::Value {
                        result_kind: result_kind.clone(),
                        inspected: inspected.clone(),
                    },
                );
            }
            Event::ResultsTruncated { line_number } => {
                self.push(*line_number, LineRecord::Truncated);
            }
            Event::Exception {
                line_number,
                class_name,
                message,
                backtrace,
            } => {
                self.push(
                    *line_number,
                    LineRecord::Exception(ExceptionRecord {
                        line_number: *line_number,
                        class_name: class_name.clone(),
                        message: message.clone(),
                        backtrace: backtrace.clone(),
                    }),
                );
            }
            Event::Stdout { value } => self.result.stdout.extend_from_slice(value),
            Event::Stderr { value } => self.result.stderr.extend_from_slice(value),
            Event::MaxLineCaptures { value } => self.result.max_line_captures = Some(*value),
            Event::Exitstatus { value } => self.result.exitstatus = Some(*value),
            Event::NumLines { value } => self.result.num_lines = Some(*value),
            Event::ToolVersion { value } => self.result.tool_version = Some(value.clone()),
            Event::WorkerRuntimeVersion { value } => {
                self.result.worker_runtime_version = Some(value.clone())
            }
            Event::Filename { value } => self.result.filename = Some(value.clone()),
            Event::Timeout { seconds } => self.result.timeout_seconds = Some(*seconds),
            Event::Finished => {
                self.result.finished = true;
                self.finalized = true;
            }
            Event::Exec | Event::StdoutClosed | Event::StderrClosed | Event::EventStreamClosed => {}
        }
    }
}

impl Handler for ResultBuilder {
    fn name(&self) -> &'static str {
        "result_builder"
    }

    fn observe(&mut self, ev: &Event) -> Result<(), HandlerError> {
        if self.finalized {
            if !ev.kind().is_structural() {
                tracing::warn!(
                    target: "linetrace.result",
                    kind = %ev.kind(),
                    "event after result was finalized, dropped"
                );
            }
            return Ok(());
        }
        self.apply(ev);
        Ok(())
    }
}
