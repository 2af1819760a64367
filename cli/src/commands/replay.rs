use std::path::Path;

use linetrace_core::api::{
    drain_blocking, drain_events, from_json_line, AppConfig, CliError, EventCodec, HandlerChain,
    ResultBuilder, RunResult,
};
use linetrace_plugins::factory::build_diagnostics;

use super::cli::{ReplayArgs, ReplayFormat};
use super::print_result;

/// JSONL recordings start with an object; a binary frame never starts with `{`
/// because no event tag is that large.
pub fn detect_format(bytes: &[u8]) -> ReplayFormat {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => ReplayFormat::Jsonl,
        _ => ReplayFormat::Binary,
    }
}

pub fn replay_bytes(
    cfg: &AppConfig,
    bytes: &[u8],
    format: ReplayFormat,
) -> Result<RunResult, CliError> {
    let format = match format {
        ReplayFormat::Auto => detect_format(bytes),
        other => other,
    };

    let mut diagnostics = build_diagnostics(&cfg.diagnostics);
    let mut builder = ResultBuilder::new().with_total_capture_limit(cfg.capture.limit());
    let drained = {
        let mut chain = HandlerChain::new();
        if let Some(d) = diagnostics.as_mut() {
            chain.push(d);
        }
        chain.push(&mut builder);
        match format {
            ReplayFormat::Jsonl => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| anyhow::anyhow!("JSONL recording is not UTF-8: {e}"))?;
                let events = text
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(from_json_line);
                drain_events(events, &mut chain)
            }
            ReplayFormat::Binary | ReplayFormat::Auto => drain_blocking(
                bytes,
                EventCodec::new(cfg.codec.max_frame_bytes),
                &mut chain,
            ),
        }
    };
    // a recording cut short never delivers `Finished`
    if let Some(d) = diagnostics.as_mut() {
        d.flush();
    }
    let delivered = drained?;

    tracing::info!(
        target: "linetrace.replay",
        events = delivered,
        format = ?format,
        "recording replayed"
    );
    Ok(builder.finish())
}

pub fn replay_cmd(mut cfg: AppConfig, args: ReplayArgs) -> Result<(), CliError> {
    if args.debug {
        cfg.diagnostics.enabled = true;
    }
    let bytes = std::fs::read(Path::new(&args.events))?;
    let result = replay_bytes(&cfg, &bytes, args.format)?;
    print_result(&result)?;
    Ok(())
}
