use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::event::{Event, EventKind};

use super::frame::{encode_into, HEADER_LEN};
use super::reader::parse_body;

pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Length-prefixed event framing for `FramedRead`/`FramedWrite`.
///
/// `decode` consumes exactly one frame and leaves anything after it in the
/// buffer, so pipelined frames and partial reads are both fine.
#[derive(Debug, Clone)]
pub struct EventCodec {
    max_frame_bytes: usize,
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl EventCodec {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }
}

impl Decoder for EventCodec {
    type Item = Event;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>, ProtocolError> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let tag = src[0];
        let kind = EventKind::from_tag(tag).ok_or(ProtocolError::UnknownKind(tag))?;
        let body_len = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;
        if body_len > self.max_frame_bytes {
            return Err(ProtocolError::FrameTooLarge {
                len: body_len,
                max: self.max_frame_bytes,
            });
        }

        let frame_len = HEADER_LEN + body_len;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        let body = src.split_to(body_len);
        let ev = parse_body(kind, &body)?;
        tracing::trace!(target: "linetrace.codec", kind = %kind, body_len, "decoded frame");
        Ok(Some(ev))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Event>, ProtocolError> {
        if let Some(ev) = self.decode(src)? {
            return Ok(Some(ev));
        }
        if src.is_empty() {
            return Ok(None);
        }
        if src.len() < HEADER_LEN {
            return Err(ProtocolError::TruncatedHeader {
                available: src.len(),
            });
        }
        let body_len = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;
        Err(ProtocolError::IncompleteFrame {
            expected: HEADER_LEN + body_len,
            available: src.len(),
        })
    }
}

impl Encoder<Event> for EventCodec {
    type Error = ProtocolError;

    fn encode(&mut self, ev: Event, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        encode_into(&ev, dst)
    }
}

impl Encoder<&Event> for EventCodec {
    type Error = ProtocolError;

    fn encode(&mut self, ev: &Event, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        encode_into(ev, dst)
    }
}
