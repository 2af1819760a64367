use std::io::Write;

use anyhow::{Context, Result};

use linetrace_core::api::{AppConfig, EventsOutFormat};
use linetrace_core::config::{DiagnosticsConfig, EventsOutConfig};

use crate::handlers::{DiagnosticFormatter, StreamEmitter};

pub type BoxedSink = Box<dyn Write + Send>;

pub fn build_diagnostics(cfg: &DiagnosticsConfig) -> Option<DiagnosticFormatter<std::io::Stderr>> {
    if !cfg.enabled {
        return None;
    }
    Some(
        DiagnosticFormatter::new(std::io::stderr())
            .with_width(cfg.width)
            .with_block_max_lines(cfg.block_max_lines),
    )
}

pub fn build_events_out(cfg: &EventsOutConfig) -> Result<Option<StreamEmitter<BoxedSink>>> {
    if !cfg.enabled {
        tracing::debug!(
            target: "linetrace.events_out",
            "events_out is disabled (enabled=false)"
        );
        return Ok(None);
    }
    if cfg.path.trim().is_empty() {
        tracing::warn!(
            target: "linetrace.events_out",
            "events_out path is empty in config, events will not be re-emitted"
        );
        return Ok(None);
    }

    let sink: BoxedSink = if cfg.path == "stdout:" {
        Box::new(std::io::stdout())
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cfg.path)
            .with_context(|| format!("failed to open events_out file {}", cfg.path))?;
        Box::new(file)
    };

    tracing::info!(
        target: "linetrace.events_out",
        path = %cfg.path,
        format = ?cfg.format,
        "events_out writer started"
    );
    Ok(Some(StreamEmitter::new(sink, cfg.format)))
}

/// `stdout:` re-emission and the JSON result both want the supervisor's
/// stdout; the binary stream would corrupt it.
pub fn events_out_conflicts_with_result(cfg: &AppConfig) -> bool {
    cfg.events_out.enabled
        && cfg.events_out.path == "stdout:"
        && cfg.events_out.format == EventsOutFormat::Binary
}
