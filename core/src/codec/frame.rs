use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::event::Event;

/// `tag: u8` followed by `body_len: u32` (big-endian).
pub const HEADER_LEN: usize = 5;

/// Encode a single event into a standalone frame.
pub fn encode(ev: &Event) -> Result<Bytes, ProtocolError> {
    let mut buf = BytesMut::new();
    encode_into(ev, &mut buf)?;
    Ok(buf.freeze())
}

/// Append the frame for `ev` to `dst`.
///
/// On error `dst` is left exactly as it was.
pub fn encode_into(ev: &Event, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    ev.validate()?;
    let start = dst.len();
    dst.put_u8(ev.kind().tag());
    dst.put_u32(0);
    let body_start = dst.len();

    if let Err(e) = write_body(ev, dst) {
        dst.truncate(start);
        return Err(e);
    }

    let body_len = dst.len() - body_start;
    let Ok(len) = u32::try_from(body_len) else {
        dst.truncate(start);
        return Err(ProtocolError::FrameTooLarge {
            len: body_len,
            max: u32::MAX as usize,
        });
    };
    dst[start + 1..body_start].copy_from_slice(&len.to_be_bytes());
    Ok(())
}

fn write_body(ev: &Event, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    match ev {
        Event::LineResult {
            line_number,
            result_kind,
            inspected,
        } => {
            dst.put_u64(*line_number);
            put_field(dst, result_kind.as_bytes())?;
            put_field(dst, inspected.as_bytes())?;
        }
        Event::ResultsTruncated { line_number } => dst.put_u64(*line_number),
        Event::Exception {
            line_number,
            class_name,
            message,
            backtrace,
        } => {
            dst.put_u64(*line_number);
            put_field(dst, class_name.as_bytes())?;
            put_field(dst, message.as_bytes())?;
            put_len(dst, backtrace.len())?;
            for frame in backtrace {
                put_field(dst, frame.as_bytes())?;
            }
        }
        Event::Stdout { value } | Event::Stderr { value } => put_field(dst, value)?,
        Event::MaxLineCaptures { value } | Event::NumLines { value } => dst.put_u64(*value),
        Event::Exitstatus { value } => dst.put_i32(*value),
        Event::ToolVersion { value }
        | Event::WorkerRuntimeVersion { value }
        | Event::Filename { value } => put_field(dst, value.as_bytes())?,
        Event::Timeout { seconds } => dst.put_f64(*seconds),
        Event::Exec
        | Event::Finished
        | Event::StdoutClosed
        | Event::StderrClosed
        | Event::EventStreamClosed => {}
    }
    Ok(())
}

fn put_field(dst: &mut BytesMut, bytes: &[u8]) -> Result<(), ProtocolError> {
    put_len(dst, bytes.len())?;
    dst.put_slice(bytes);
    Ok(())
}

fn put_len(dst: &mut BytesMut, len: usize) -> Result<(), ProtocolError> {
    let len32 = u32::try_from(len).map_err(|_| ProtocolError::FrameTooLarge {
        len,
        max: u32::MAX as usize,
    })?;
    dst.put_u32(len32);
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn structural_event_is_header_only() {
        let frame = encode(&Event::Finished).unwrap();
        assert_eq!(&frame[..], &[14, 0, 0, 0, 0]);
    }

    #[test]
    fn stdout_layout_is_length_prefixed() {
        let frame = encode(&Event::stdout("\n\0")).unwrap();
        assert_eq!(&frame[..], &[4, 0, 0, 0, 6, 0, 0, 0, 2, b'\n', 0]);
    }

    #[test]
    fn empty_payload_still_carries_length() {
        let frame = encode(&Event::stderr(Vec::new())).unwrap();
        assert_eq!(&frame[..], &[5, 0, 0, 0, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn encode_into_appends_after_existing_bytes() {
        let mut buf = BytesMut::from(&b"xy"[..]);
        encode_into(&Event::Exitstatus { value: -1 }, &mut buf).unwrap();
        assert_eq!(&buf[..], &[b'x', b'y', 7, 0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xFF]);
    }
}
