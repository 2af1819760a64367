use anyhow::{anyhow, Result};

use linetrace_core::api::{
    run_worker, AppConfig, CliError, EventsOutFormat, HandlerChain, ResultBuilder, RunnerSpec,
};
use linetrace_core::config::validate;
use linetrace_plugins::factory::{build_diagnostics, build_events_out, events_out_conflicts_with_result};
use linetrace_plugins::handlers::ExitRecorder;

use super::cli::{RunArgs, StreamFormat};
use super::print_result;

/// Exit code reported when the worker was killed on deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Fold command-line flags into the loaded config. Flags win.
pub fn apply_run_args(cfg: &mut AppConfig, args: &RunArgs) -> Result<(), CliError> {
    if let Some(t) = args.timeout {
        cfg.control.timeout_secs = t;
    }
    if args.debug {
        cfg.diagnostics.enabled = true;
    }
    if let Some(path) = &args.events_out {
        cfg.events_out.enabled = true;
        cfg.events_out.path = path.clone();
    }
    if let Some(fmt) = args.events_format {
        cfg.events_out.format = match fmt {
            StreamFormat::Jsonl => EventsOutFormat::Jsonl,
            StreamFormat::Binary => EventsOutFormat::Binary,
        };
    }
    validate(cfg)?;
    Ok(())
}

pub fn parse_env_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|raw| {
            let (k, v) = raw
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid --env value {raw:?}, expected KEY=VALUE"))?;
            if k.trim().is_empty() {
                return Err(anyhow!("invalid --env value {raw:?}, empty key"));
            }
            Ok((k.trim().to_string(), v.to_string()))
        })
        .collect()
}

pub async fn run_cmd(mut cfg: AppConfig, args: RunArgs) -> Result<i32, CliError> {
    apply_run_args(&mut cfg, &args)?;

    let mut spec = RunnerSpec::new(args.program.clone())
        .args(args.args.clone())
        .with_config(&cfg);
    spec.env = parse_env_pairs(&args.env)?;

    let mut diagnostics = build_diagnostics(&cfg.diagnostics);
    let mut emitter = build_events_out(&cfg.events_out)?;
    let mut recorder = ExitRecorder::new();
    let mut builder = ResultBuilder::new().with_total_capture_limit(cfg.capture.limit());

    let run = {
        let mut chain = HandlerChain::new();
        if let Some(d) = diagnostics.as_mut() {
            chain.push(d);
        }
        chain.push(&mut recorder);
        if let Some(e) = emitter.as_mut() {
            chain.push(e);
        }
        chain.push(&mut builder);
        tracing::debug!(
            target: "linetrace.chain",
            handlers = ?chain.names(),
            "handler chain assembled"
        );
        run_worker(&spec, &mut chain).await
    };
    if let Some(d) = diagnostics.as_mut() {
        d.flush();
    }
    let outcome = run?;

    let result = builder.finish();
    if events_out_conflicts_with_result(&cfg) {
        tracing::info!(
            target: "linetrace.runner",
            "binary events_out owns stdout, result JSON not printed"
        );
    } else {
        print_result(&result)?;
    }

    if recorder.timed_out() {
        return Ok(TIMEOUT_EXIT_CODE);
    }
    Ok(recorder.exitstatus().or(outcome.exit_code).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(program: &str) -> RunArgs {
        RunArgs {
            timeout: None,
            debug: false,
            events_out: None,
            events_format: None,
            env: Vec::new(),
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = AppConfig::default();
        let mut args = run_args("ruby");
        args.timeout = Some(3.0);
        args.debug = true;
        args.events_out = Some("events.bin".into());
        args.events_format = Some(StreamFormat::Binary);
        apply_run_args(&mut cfg, &args).unwrap();

        assert_eq!(cfg.control.timeout_secs, 3.0);
        assert!(cfg.diagnostics.enabled);
        assert!(cfg.events_out.enabled);
        assert_eq!(cfg.events_out.path, "events.bin");
        assert_eq!(cfg.events_out.format, EventsOutFormat::Binary);
    }

    #[test]
    fn out_of_range_timeout_is_rejected() {
        for t in [-1.0, 1e30] {
            let mut cfg = AppConfig::default();
            let mut args = run_args("ruby");
            args.timeout = Some(t);
            assert!(matches!(
                apply_run_args(&mut cfg, &args),
                Err(CliError::Config(_))
            ));
        }
    }

    #[test]
    fn env_pairs() {
        let pairs = parse_env_pairs(&["A=1".into(), "B=x=y".into()]).unwrap();
        assert_eq!(
            pairs,
            vec![("A".into(), "1".into()), ("B".into(), "x=y".into())]
        );
        assert!(parse_env_pairs(&["NOVALUE".into()]).is_err());
        assert!(parse_env_pairs(&["=1".into()]).is_err());
    }
}
