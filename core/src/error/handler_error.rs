// core/src/error/handler_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{handler}: failed to write to sink")]
    Sink {
        handler: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{handler}: failed to encode event")]
    Encode {
        handler: &'static str,
        #[source]
        source: crate::error::ProtocolError,
    },
}
