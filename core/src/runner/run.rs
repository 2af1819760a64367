use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tokio_util::codec::FramedRead;

use crate::codec::EventCodec;
use crate::error::{DrainError, ProtocolError, RunnerError};
use crate::event::Event;
use crate::handler::Handler;

use super::drain::{log_corrupt, pump};
use super::exit::normalize_exit;
use super::types::{RunOutcome, RunnerSpec};

/// Spawn the worker, feed its event stream through `chain`, and close the run.
///
/// The worker writes framed events to its stdout; its stderr is inherited.
/// After the stream closes the runner appends `EventStreamClosed`, then
/// `Exitstatus` (unless the worker was killed on deadline), then `Finished`.
///
/// On deadline the worker is killed, a `Timeout` event is delivered, and bytes
/// already written are drained for at most `kill_grace` before the stream is
/// declared closed. A frame cut short by the kill is dropped; the run still
/// completes with the captures decoded before it.
pub async fn run_worker(spec: &RunnerSpec, chain: &mut dyn Handler) -> Result<RunOutcome, RunnerError> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let started = Instant::now();
    let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        program: spec.program.clone(),
        source,
    })?;
    tracing::info!(
        target: "linetrace.runner",
        program = %spec.program,
        pid = child.id().unwrap_or_default(),
        timeout_secs = spec.timeout.map(|t| t.as_secs_f64()),
        "worker started"
    );

    let stdout = child.stdout.take().ok_or(RunnerError::MissingStdout)?;
    let mut frames = FramedRead::new(stdout, EventCodec::new(spec.max_frame_bytes));
    let mut delivered = 0usize;
    let mut timed_out = false;

    match spec.timeout {
        None => pump(&mut frames, chain, &mut delivered)
            .await
            .inspect_err(log_corrupt)?,
        Some(limit) => {
            match tokio::time::timeout(limit, pump(&mut frames, chain, &mut delivered)).await {
                Ok(res) => res.inspect_err(log_corrupt)?,
                Err(_) => {
                    timed_out = true;
                    tracing::warn!(
                        target: "linetrace.runner",
                        timeout_secs = limit.as_secs_f64(),
                        events = delivered,
                        "worker exceeded deadline, killing"
                    );
                    child.start_kill().map_err(RunnerError::Kill)?;
                    observe(chain, &Event::Timeout {
                        seconds: limit.as_secs_f64(),
                    })?;
                    let grace = tokio::time::timeout(
                        spec.kill_grace,
                        pump(&mut frames, chain, &mut delivered),
                    )
                    .await;
                    match grace {
                        Ok(Err(DrainError::Protocol(
                            e @ (ProtocolError::TruncatedHeader { .. }
                            | ProtocolError::IncompleteFrame { .. }),
                        ))) => tracing::warn!(
                            target: "linetrace.runner",
                            error = %e,
                            "worker killed mid-frame, partial frame dropped"
                        ),
                        Ok(res) => res.inspect_err(log_corrupt)?,
                        Err(_) => tracing::warn!(
                            target: "linetrace.runner",
                            grace_ms = spec.kill_grace.as_millis() as u64,
                            "event stream still open after kill, closing it"
                        ),
                    }
                }
            }
        }
    }
    drop(frames);

    observe(chain, &Event::EventStreamClosed)?;

    let status = child.wait().await.map_err(RunnerError::Wait)?;
    let exit_code = if timed_out {
        None
    } else {
        let code = normalize_exit(status);
        observe(chain, &Event::Exitstatus { value: code })?;
        Some(code)
    };
    observe(chain, &Event::Finished)?;

    let outcome = RunOutcome {
        events: delivered,
        exit_code,
        timed_out,
        duration: started.elapsed(),
    };
    tracing::info!(
        target: "linetrace.runner",
        events = outcome.events,
        exit_code = ?outcome.exit_code,
        timed_out = outcome.timed_out,
        duration_ms = outcome.duration.as_millis() as u64,
        "worker finished"
    );
    Ok(outcome)
}

fn observe(chain: &mut dyn Handler, ev: &Event) -> Result<(), RunnerError> {
    chain.observe(ev).map_err(|e| RunnerError::Drain(DrainError::Handler(e)))
}
