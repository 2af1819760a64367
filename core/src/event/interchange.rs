//! Structured-text form of an [`Event`]: one JSON object per line with a
//! `kind` discriminator.
//!
//! Byte payloads (`stdout`/`stderr`) are written as a plain JSON string when
//! they are valid UTF-8 and as `{"base64": "..."}` otherwise, so no byte is
//! ever dropped or replaced on the way through text.

use crate::error::ProtocolError;

use super::Event;

pub fn to_json_line(ev: &Event) -> Result<String, ProtocolError> {
    ev.validate()?;
    serde_json::to_string(ev).map_err(ProtocolError::InvalidJson)
}

pub fn from_json_line(line: &str) -> Result<Event, ProtocolError> {
    let s = line.trim();
    let ev = serde_json::from_str::<Event>(s).map_err(ProtocolError::InvalidJson)?;
    ev.validate()?;
    Ok(ev)
}

pub(crate) mod payload {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Escaped { base64: String },
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(bytes) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => Repr::Escaped {
                base64: STANDARD.encode(bytes),
            }
            .serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Ok(text.into_bytes()),
            Repr::Escaped { base64 } => STANDARD.decode(base64.as_bytes()).map_err(D::Error::custom),
        }
    }
}
