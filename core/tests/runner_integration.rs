//! Spawns real workers through `sh`; unix only.
#![cfg(unix)]

use std::io::Write;
use std::time::Duration;

use linetrace_core::api::{encode, run_worker, Event, ResultBuilder, RunnerSpec};
use pretty_assertions::assert_eq;

/// Frames for `events` in a temp file, plus a `cat` command that replays them.
fn recorded(events: &[Event]) -> (tempfile::NamedTempFile, String) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for ev in events {
        file.write_all(&encode(ev).unwrap()).unwrap();
    }
    file.flush().unwrap();
    let cmd = format!("cat '{}'", file.path().display());
    (file, cmd)
}

#[tokio::test]
async fn worker_exit_is_recorded_after_stream_closes() {
    let (_file, cat) = recorded(&[
        Event::line_result(1, "value", "3"),
        Event::stdout("hi\n"),
        Event::line_result(1, "value", "4"),
    ]);
    let script = format!("{cat}; exit 3");
    let spec = RunnerSpec::new("sh").args(["-c", script.as_str()]);
    let mut builder = ResultBuilder::new();
    let outcome = run_worker(&spec, &mut builder).await.unwrap();

    assert_eq!(outcome.events, 3);
    assert_eq!(outcome.exit_code, Some(3));
    assert!(!outcome.timed_out);

    let result = builder.finish();
    assert!(result.is_complete());
    assert_eq!(result.exitstatus(), Some(3));
    assert_eq!(result.stdout(), b"hi\n");
    assert_eq!(result.line(1).len(), 2);
}

#[tokio::test]
async fn deadline_kills_worker_and_keeps_partial_captures() {
    let (_file, cat) = recorded(&[Event::line_result(2, "value", "\"partial\"")]);
    let script = format!("{cat}; exec sleep 30");
    let spec = RunnerSpec::new("sh")
        .args(["-c", script.as_str()])
        .timeout(Some(Duration::from_millis(300)));
    let mut builder = ResultBuilder::new();
    let outcome = run_worker(&spec, &mut builder).await.unwrap();

    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, None);
    assert!(outcome.duration < Duration::from_secs(10));

    let result = builder.finish();
    assert_eq!(result.timeout_seconds(), Some(0.3));
    assert_eq!(result.exitstatus(), None);
    assert_eq!(result.line(2).len(), 1);
    assert!(result.is_complete());
}

#[tokio::test]
async fn worker_killed_mid_frame_still_yields_timed_out_result() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&encode(&Event::line_result(4, "value", "1")).unwrap())
        .unwrap();
    // header promises 100 body bytes, only 3 follow
    let partial = encode(&Event::stdout(vec![b'x'; 96])).unwrap();
    assert_eq!(partial.len(), 105);
    file.write_all(&partial[..8]).unwrap();
    file.flush().unwrap();

    let script = format!("cat '{}'; exec sleep 30", file.path().display());
    let spec = RunnerSpec::new("sh")
        .args(["-c", script.as_str()])
        .timeout(Some(Duration::from_millis(300)));
    let mut builder = ResultBuilder::new();
    let outcome = run_worker(&spec, &mut builder).await.unwrap();

    assert!(outcome.timed_out);
    assert_eq!(outcome.events, 1);
    let result = builder.finish();
    assert!(result.is_complete());
    assert_eq!(result.timeout_seconds(), Some(0.3));
    assert_eq!(result.exitstatus(), None);
    assert_eq!(result.line(4).len(), 1);
    assert!(result.stdout().is_empty());
}

#[tokio::test]
async fn corrupt_stream_without_deadline_is_still_fatal() {
    let (_file, cat) = recorded(&[Event::Exec]);
    let script = format!("{cat}; printf 'zzzzz'");
    let spec = RunnerSpec::new("sh").args(["-c", script.as_str()]);
    let mut builder = ResultBuilder::new();
    let err = run_worker(&spec, &mut builder).await.unwrap_err();
    assert!(matches!(
        err,
        linetrace_core::api::RunnerError::Drain(linetrace_core::api::DrainError::Protocol(_))
    ));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let spec = RunnerSpec::new("/nonexistent/linetrace-worker");
    let mut builder = ResultBuilder::new();
    let err = run_worker(&spec, &mut builder).await.unwrap_err();
    assert!(matches!(
        err,
        linetrace_core::api::RunnerError::Spawn { .. }
    ));
}
