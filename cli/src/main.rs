use std::path::Path;

use clap::Parser;
mod commands;
use commands::cli;
use linetrace_core::api::{AppConfig, CliError};
use linetrace_core::config::{self, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = cli::Args::parse();

    let cfg = match &args.config {
        Some(path) => config::load_from(Path::new(path))?,
        None => config::load_default()?,
    };

    let exit = {
        let _guard = init_logging(&cfg.logging);
        dispatch(args.command, cfg).await?
    };
    if exit != 0 {
        std::process::exit(exit);
    }
    Ok(())
}

async fn dispatch(cmd: cli::Commands, cfg: AppConfig) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Run(run_args) => commands::run::run_cmd(cfg, run_args).await,
        cli::Commands::Replay(replay_args) => {
            commands::replay::replay_cmd(cfg, replay_args)?;
            Ok(0)
        }
    }
}

/// Logs go to stderr, or to `linetrace.log` under `logging.directory`.
/// Stdout is reserved for the result.
fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if cfg.directory.trim().is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::never(cfg.directory.trim(), "linetrace.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
