use bytes::Buf;

use crate::error::ProtocolError;
use crate::event::{Event, EventKind};

/// Cursor over one frame body. Every read is bounds-checked; a body that is
/// too short or has bytes left over is a [`ProtocolError::MalformedBody`].
struct BodyReader<'a> {
    kind: EventKind,
    data: &'a [u8],
}

impl<'a> BodyReader<'a> {
    fn new(kind: EventKind, data: &'a [u8]) -> Self {
        Self { kind, data }
    }

    fn need(&self, n: usize, what: &str) -> Result<(), ProtocolError> {
        if self.data.remaining() < n {
            return Err(ProtocolError::malformed(
                self.kind,
                format!(
                    "{what}: need {n} bytes, {} remaining",
                    self.data.remaining()
                ),
            ));
        }
        Ok(())
    }

    fn u32(&mut self, what: &str) -> Result<u32, ProtocolError> {
        self.need(4, what)?;
        Ok(self.data.get_u32())
    }

    fn u64(&mut self, what: &str) -> Result<u64, ProtocolError> {
        self.need(8, what)?;
        Ok(self.data.get_u64())
    }

    fn i32(&mut self, what: &str) -> Result<i32, ProtocolError> {
        self.need(4, what)?;
        Ok(self.data.get_i32())
    }

    fn f64(&mut self, what: &str) -> Result<f64, ProtocolError> {
        self.need(8, what)?;
        Ok(self.data.get_f64())
    }

    fn line_number(&mut self) -> Result<u64, ProtocolError> {
        self.u64("line_number")
    }

    fn bytes(&mut self, what: &str) -> Result<&'a [u8], ProtocolError> {
        let len = self.u32(what)? as usize;
        self.need(len, what)?;
        let data: &'a [u8] = self.data;
        let (field, rest) = data.split_at(len);
        self.data = rest;
        Ok(field)
    }

    fn text(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        let raw = self.bytes(field)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidUtf8 {
            kind: self.kind,
            field,
        })
    }

    fn finish(self, ev: Event) -> Result<Event, ProtocolError> {
        if self.data.has_remaining() {
            return Err(ProtocolError::malformed(
                self.kind,
                format!("{} trailing bytes in body", self.data.remaining()),
            ));
        }
        ev.validate()?;
        Ok(ev)
    }
}

/// Decode the body of a frame whose header announced `kind`.
pub(crate) fn parse_body(kind: EventKind, body: &[u8]) -> Result<Event, ProtocolError> {
    let mut r = BodyReader::new(kind, body);
    let ev = match kind {
        EventKind::LineResult => Event::LineResult {
            line_number: r.line_number()?,
            result_kind: r.text("result_kind")?,
            inspected: r.text("inspected")?,
        },
        EventKind::ResultsTruncated => Event::ResultsTruncated {
            line_number: r.line_number()?,
        },
        EventKind::Exception => {
            let line_number = r.line_number()?;
            let class_name = r.text("class_name")?;
            let message = r.text("message")?;
            let count = r.u32("backtrace")? as usize;
            // Each entry needs at least its 4-byte length prefix.
            r.need(count.saturating_mul(4), "backtrace")?;
            let mut backtrace = Vec::with_capacity(count);
            for _ in 0..count {
                backtrace.push(r.text("backtrace")?);
            }
            Event::Exception {
                line_number,
                class_name,
                message,
                backtrace,
            }
        }
        EventKind::Stdout => Event::Stdout {
            value: r.bytes("value")?.to_vec(),
        },
        EventKind::Stderr => Event::Stderr {
            value: r.bytes("value")?.to_vec(),
        },
        EventKind::MaxLineCaptures => Event::MaxLineCaptures {
            value: r.u64("value")?,
        },
        EventKind::Exitstatus => Event::Exitstatus {
            value: r.i32("value")?,
        },
        EventKind::NumLines => Event::NumLines {
            value: r.u64("value")?,
        },
        EventKind::ToolVersion => Event::ToolVersion {
            value: r.text("value")?,
        },
        EventKind::WorkerRuntimeVersion => Event::WorkerRuntimeVersion {
            value: r.text("value")?,
        },
        EventKind::Filename => Event::Filename {
            value: r.text("value")?,
        },
        EventKind::Timeout => Event::Timeout {
            seconds: r.f64("seconds")?,
        },
        EventKind::Exec => Event::Exec,
        EventKind::Finished => Event::Finished,
        EventKind::StdoutClosed => Event::StdoutClosed,
        EventKind::StderrClosed => Event::StderrClosed,
        EventKind::EventStreamClosed => Event::EventStreamClosed,
    };
    r.finish(ev)
}
