use std::io::Write;

use linetrace_core::api::{Event, Handler, HandlerError};

const NAME_COLUMN: usize = 22;
const MIN_ATTR_WIDTH: usize = 8;

enum Attr {
    Inline(&'static str, String),
    Block(&'static str, Vec<String>),
}

/// Human-readable trace of every event, for debugging a worker.
///
/// Output is buffered and written to the sink when `Finished` arrives or
/// [`DiagnosticFormatter::flush`] is called. Sink
/// failures are logged once and never stop the event from being forwarded.
pub struct DiagnosticFormatter<W> {
    sink: W,
    width: usize,
    block_max_lines: usize,
    pending: String,
    write_failed: bool,
}

impl<W: Write + Send> DiagnosticFormatter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            width: 100,
            block_max_lines: 20,
            pending: String::new(),
            write_failed: false,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_block_max_lines(mut self, lines: usize) -> Self {
        self.block_max_lines = lines;
        self
    }

    /// Rendered text not yet written to the sink.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn render(&self, ev: &Event) -> String {
        let mut header = format!("{:<width$}|", ev.kind().name(), width = NAME_COLUMN);
        let mut blocks = Vec::new();
        for attr in self.attributes(ev) {
            match attr {
                Attr::Inline(key, value) => {
                    let budget = self
                        .width
                        .saturating_sub(NAME_COLUMN + key.len() + 3)
                        .max(MIN_ATTR_WIDTH);
                    header.push_str(&format!(" {key}={}", ellipsize(&value, budget)));
                }
                Attr::Block(key, lines) => blocks.push((key, lines)),
            }
        }

        let mut out = ellipsize(&header, self.width);
        out.push('\n');
        for (key, lines) in blocks {
            out.push_str(&format!("  {key}:\n"));
            for line in lines.iter().take(self.block_max_lines) {
                out.push_str("    ");
                out.push_str(&ellipsize(line, self.width.saturating_sub(4)));
                out.push('\n');
            }
            if lines.len() > self.block_max_lines {
                out.push_str(&format!(
                    "    … ({} more lines)\n",
                    lines.len() - self.block_max_lines
                ));
            }
        }
        out
    }

    fn attributes(&self, ev: &Event) -> Vec<Attr> {
        match ev {
            Event::LineResult {
                line_number,
                result_kind,
                inspected,
            } => vec![
                Attr::Inline("line_number", line_number.to_string()),
                Attr::Inline("result_kind", format!("{result_kind:?}")),
                self.text_attr("inspected", inspected),
            ],
            Event::ResultsTruncated { line_number } => {
                vec![Attr::Inline("line_number", line_number.to_string())]
            }
            Event::Exception {
                line_number,
                class_name,
                message,
                backtrace,
            } => {
                let mut attrs = vec![
                    Attr::Inline("line_number", line_number.to_string()),
                    Attr::Inline("class_name", format!("{class_name:?}")),
                    self.text_attr("message", message),
                ];
                if backtrace.is_empty() {
                    attrs.push(Attr::Inline("backtrace", "[]".to_string()));
                } else {
                    attrs.push(Attr::Block("backtrace", backtrace.clone()));
                }
                attrs
            }
            Event::Stdout { value } | Event::Stderr { value } => {
                vec![self.bytes_attr("value", value)]
            }
            Event::MaxLineCaptures { value } | Event::NumLines { value } => {
                vec![Attr::Inline("value", value.to_string())]
            }
            Event::Exitstatus { value } => vec![Attr::Inline("value", value.to_string())],
            Event::ToolVersion { value }
            | Event::WorkerRuntimeVersion { value }
            | Event::Filename { value } => vec![Attr::Inline("value", format!("{value:?}"))],
            Event::Timeout { seconds } => vec![Attr::Inline("seconds", seconds.to_string())],
            Event::Exec
            | Event::Finished
            | Event::StdoutClosed
            | Event::StderrClosed
            | Event::EventStreamClosed => Vec::new(),
        }
    }

    fn is_large(&self, text: &str) -> bool {
        text.trim_end_matches('\n').contains('\n') || text.chars().count() > self.width / 2
    }

    fn text_attr(&self, key: &'static str, text: &str) -> Attr {
        if self.is_large(text) {
            Attr::Block(key, text.lines().map(|l| format!("{l:?}")).collect())
        } else {
            Attr::Inline(key, format!("{text:?}"))
        }
    }

    fn bytes_attr(&self, key: &'static str, bytes: &[u8]) -> Attr {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.text_attr(key, text),
            Err(_) => {
                let escaped = bytes.escape_ascii().to_string();
                if escaped.chars().count() > self.width / 2 {
                    Attr::Block(key, chunk(&escaped, self.width.saturating_sub(4)))
                } else {
                    Attr::Inline(key, format!("\"{escaped}\""))
                }
            }
        }
    }

    /// Write out everything buffered so far.
    ///
    /// Called on `Finished`; a driver calls it directly when the stream ends
    /// early or fails, so the trace up to that point is not lost.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Err(e) = self.flush_pending() {
            if !self.write_failed {
                tracing::warn!(
                    target: "linetrace.debug",
                    error = %e,
                    "failed to write diagnostics; events are still forwarded"
                );
            }
            self.write_failed = true;
            self.pending.clear();
        }
    }

    fn flush_pending(&mut self) -> std::io::Result<()> {
        self.sink.write_all(self.pending.as_bytes())?;
        self.sink.flush()?;
        self.pending.clear();
        Ok(())
    }
}

impl<W: Write + Send> Handler for DiagnosticFormatter<W> {
    fn name(&self) -> &'static str {
        "diagnostics"
    }

    fn observe(&mut self, ev: &Event) -> Result<(), HandlerError> {
        let rendered = self.render(ev);
        self.pending.push_str(&rendered);

        if matches!(ev, Event::Finished) {
            self.flush();
        }
        Ok(())
    }
}

fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn chunk(s: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|c| c.iter().collect())
        .collect()
}
