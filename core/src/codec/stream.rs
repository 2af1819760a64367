use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::error::ProtocolError;
use crate::event::Event;

use super::EventCodec;

const READ_CHUNK: usize = 8 * 1024;

/// Blocking, lazy decoder over any [`Read`].
///
/// Yields events in stream order and ends when the reader reports EOF. After
/// the first error the iterator is exhausted.
pub struct FrameReader<R> {
    inner: R,
    codec: EventCodec,
    buf: BytesMut,
    eof: bool,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_codec(inner, EventCodec::default())
    }

    pub fn with_codec(inner: R, codec: EventCodec) -> Self {
        Self {
            inner,
            codec,
            buf: BytesMut::with_capacity(READ_CHUNK),
            eof: false,
            done: false,
        }
    }

    fn next_event(&mut self) -> Result<Option<Event>, ProtocolError> {
        loop {
            if self.eof {
                return self.codec.decode_eof(&mut self.buf);
            }
            if let Some(ev) = self.codec.decode(&mut self.buf)? {
                return Ok(Some(ev));
            }

            let mut chunk = [0u8; READ_CHUNK];
            match self.inner.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(ProtocolError::Io(e)),
            }
        }
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Event, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(Some(ev)) => Some(Ok(ev)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode a complete, closed byte stream.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Event>, ProtocolError> {
    FrameReader::new(bytes).collect()
}
