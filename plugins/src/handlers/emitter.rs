use std::io::Write;

use bytes::BytesMut;
use linetrace_core::api::{encode_into, to_json_line, Event, EventsOutFormat, Handler, HandlerError};

/// Re-emits every event to a sink, flushing after each one so a downstream
/// reader sees events as they happen.
///
/// `Binary` writes the same frames the worker sent; `Jsonl` writes one JSON
/// object per line.
pub struct StreamEmitter<W> {
    sink: W,
    format: EventsOutFormat,
    buf: BytesMut,
    written: u64,
}

impl<W: Write + Send> StreamEmitter<W> {
    pub fn new(sink: W, format: EventsOutFormat) -> Self {
        Self {
            sink,
            format,
            buf: BytesMut::new(),
            written: 0,
        }
    }

    pub fn format(&self) -> EventsOutFormat {
        self.format
    }

    /// Events written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn sink_err(&self, source: std::io::Error) -> HandlerError {
        HandlerError::Sink {
            handler: self.name(),
            source,
        }
    }
}

impl<W: Write + Send> Handler for StreamEmitter<W> {
    fn name(&self) -> &'static str {
        "stream_emitter"
    }

    fn observe(&mut self, ev: &Event) -> Result<(), HandlerError> {
        self.buf.clear();
        match self.format {
            EventsOutFormat::Binary => {
                encode_into(ev, &mut self.buf).map_err(|source| HandlerError::Encode {
                    handler: "stream_emitter",
                    source,
                })?;
            }
            EventsOutFormat::Jsonl => {
                let line = to_json_line(ev).map_err(|source| HandlerError::Encode {
                    handler: "stream_emitter",
                    source,
                })?;
                self.buf.extend_from_slice(line.as_bytes());
                self.buf.extend_from_slice(b"\n");
            }
        }

        if let Err(e) = self.sink.write_all(&self.buf) {
            return Err(self.sink_err(e));
        }
        if let Err(e) = self.sink.flush() {
            return Err(self.sink_err(e));
        }
        self.written += 1;
        tracing::trace!(
            target: "linetrace.emitter",
            kind = %ev.kind(),
            bytes = self.buf.len(),
            "event re-emitted"
        );
        Ok(())
    }
}
