// core/src/error/cli_error.rs
use thiserror::Error;

use super::{ConfigError, DrainError, RunnerError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("replay failed: {0}")]
    Replay(#[from] DrainError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
