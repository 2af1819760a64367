mod chain;
mod r#trait;

pub use chain::HandlerChain;
pub use r#trait::Handler;
