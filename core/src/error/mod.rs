mod cli_error;
mod config_error;
mod handler_error;
mod protocol_error;
mod runner_error;

pub use cli_error::CliError;
pub use config_error::ConfigError;
pub use handler_error::HandlerError;
pub use protocol_error::ProtocolError;
pub use runner_error::{DrainError, RunnerError};
