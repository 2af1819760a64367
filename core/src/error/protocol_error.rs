// core/src/error/protocol_error.rs
use thiserror::Error;

use crate::event::EventKind;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("truncated frame header: {available} of 5 bytes before end of stream")]
    TruncatedHeader { available: usize },

    #[error("incomplete frame at end of stream: expected {expected} bytes, got {available}")]
    IncompleteFrame { expected: usize, available: usize },

    #[error("unknown event kind tag: {0:#04x}")]
    UnknownKind(u8),

    #[error("malformed {kind} body: {reason}")]
    MalformedBody { kind: EventKind, reason: String },

    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("invalid utf-8 in {kind}.{field}")]
    InvalidUtf8 { kind: EventKind, field: &'static str },

    #[error("invalid json event line")]
    InvalidJson(#[source] serde_json::Error),

    #[error("io error while reading event stream")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    pub(crate) fn malformed(kind: EventKind, reason: impl Into<String>) -> Self {
        ProtocolError::MalformedBody {
            kind,
            reason: reason.into(),
        }
    }
}
