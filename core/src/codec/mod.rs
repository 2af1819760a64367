//! Binary wire framing for [`Event`](crate::event::Event).
//!
//! ```text
//! +--------+----------------+----------------------+
//! | tag u8 | body_len u32BE | body (body_len bytes) |
//! +--------+----------------+----------------------+
//! ```
//!
//! Inside a body, integers are big-endian and every text or byte field is a
//! `u32BE` length followed by the raw bytes. Nothing is escaped, so payloads
//! may contain any byte value.

mod decoder;
mod frame;
mod reader;
mod stream;

pub use decoder::{EventCodec, DEFAULT_MAX_FRAME_BYTES};
pub use frame::{encode, encode_into, HEADER_LEN};
pub use stream::{decode_all, FrameReader};
