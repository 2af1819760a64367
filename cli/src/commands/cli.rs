use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Jsonl,
    Binary,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayFormat {
    /// Binary unless the file starts with `{`.
    Auto,
    Binary,
    Jsonl,
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Supervise a traced worker and collect its per-line result")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to `linetrace.toml` in the working directory.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Spawn a worker and supervise its event stream.
    Run(RunArgs),
    /// Rebuild a result from a recorded event stream.
    Replay(ReplayArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Worker deadline in seconds; 0 disables it.
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Print a human-readable trace of every event to stderr.
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Re-emit every event to this path (`stdout:` for stdout).
    #[arg(long)]
    pub events_out: Option<String>,

    #[arg(long, value_enum)]
    pub events_format: Option<StreamFormat>,

    /// Extra environment variables for the worker (KEY=VALUE).
    #[arg(long = "env", action = clap::ArgAction::Append)]
    pub env: Vec<String>,

    /// Worker program.
    pub program: String,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(long)]
    pub events: String,

    #[arg(long, value_enum, default_value_t = ReplayFormat::Auto)]
    pub format: ReplayFormat,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_keeps_worker_flags_for_the_worker() {
        let args = Args::parse_from([
            "linetrace",
            "run",
            "--timeout",
            "2.5",
            "ruby",
            "script.rb",
            "--debug",
        ]);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.timeout, Some(2.5));
                assert!(!run.debug);
                assert_eq!(run.program, "ruby");
                assert_eq!(run.args, vec!["script.rb", "--debug"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn replay_defaults_to_auto_format() {
        let args = Args::parse_from(["linetrace", "replay", "--events", "run.bin"]);
        match args.command {
            Commands::Replay(replay) => {
                assert_eq!(replay.format, ReplayFormat::Auto);
                assert_eq!(replay.events, "run.bin");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_flag() {
        let args = Args::parse_from([
            "linetrace",
            "replay",
            "--events",
            "x.jsonl",
            "--config",
            "alt.toml",
        ]);
        assert_eq!(args.config.as_deref(), Some("alt.toml"));
    }
}
