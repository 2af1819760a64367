// core/src/error/runner_error.rs
use thiserror::Error;

use super::{HandlerError, ProtocolError};

/// Failure while pushing a decoded stream through a handler chain.
#[derive(Debug, Error)]
pub enum DrainError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn worker: {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker stdout was not captured")]
    MissingStdout,

    #[error("failed to wait for worker")]
    Wait(#[source] std::io::Error),

    #[error("failed to kill worker")]
    Kill(#[source] std::io::Error),

    #[error(transparent)]
    Drain(#[from] DrainError),
}
