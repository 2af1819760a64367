mod drain;
pub mod exit;
mod run;
pub mod types;

pub use drain::{drain, drain_blocking, drain_events, pump};
pub use exit::normalize_exit;
pub use run::run_worker;
pub use types::{RunOutcome, RunnerSpec};
