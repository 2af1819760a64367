mod builder;
mod types;

pub use builder::ResultBuilder;
pub use types::{ExceptionRecord, LineRecord, RunResult};
