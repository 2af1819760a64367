//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `linetrace_core::api` instead of reaching into internal modules.

pub use crate::codec::{decode_all, encode, encode_into, EventCodec, FrameReader};
pub use crate::config::{AppConfig, EventsOutFormat};
pub use crate::error::{CliError, ConfigError, DrainError, HandlerError, ProtocolError, RunnerError};
pub use crate::event::{from_json_line, to_json_line, Event, EventKind};
pub use crate::handler::{Handler, HandlerChain};
pub use crate::result::{ExceptionRecord, LineRecord, ResultBuilder, RunResult};
pub use crate::runner::{
    drain, drain_blocking, drain_events, run_worker, RunOutcome, RunnerSpec,
};
