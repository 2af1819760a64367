pub mod cli;
pub mod replay;
pub mod run;

use linetrace_core::api::RunResult;

/// Result JSON goes to stdout; everything else goes to stderr or the log.
pub(crate) fn print_result(result: &RunResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
