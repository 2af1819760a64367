use std::path::PathBuf;
use std::time::Duration;

use crate::codec::DEFAULT_MAX_FRAME_BYTES;
use crate::config::AppConfig;

/// How to start and supervise one worker.
#[derive(Debug, Clone)]
pub struct RunnerSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub kill_grace: Duration,
    pub max_frame_bytes: usize,
}

impl RunnerSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            timeout: None,
            kill_grace: Duration::from_millis(500),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Take deadline, grace period and frame limit from config.
    ///
    /// Expects a validated config; a timeout that is not a representable
    /// duration is treated as no deadline.
    pub fn with_config(mut self, cfg: &AppConfig) -> Self {
        self.timeout = Duration::try_from_secs_f64(cfg.control.timeout_secs)
            .ok()
            .filter(|t| !t.is_zero());
        self.kill_grace = Duration::from_millis(cfg.control.kill_grace_ms);
        self.max_frame_bytes = cfg.codec.max_frame_bytes;
        self
    }
}

/// What the runner itself observed, next to whatever the handlers built.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Events decoded from the worker (excludes the ones the runner injects).
    pub events: usize,
    /// `None` when the worker was killed on deadline.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_timeout_becomes_deadline() {
        let mut cfg = AppConfig::default();
        assert_eq!(RunnerSpec::new("w").with_config(&cfg).timeout, None);

        cfg.control.timeout_secs = 2.5;
        cfg.control.kill_grace_ms = 10;
        let spec = RunnerSpec::new("w").with_config(&cfg);
        assert_eq!(spec.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(spec.kill_grace, Duration::from_millis(10));
    }

    #[test]
    fn unrepresentable_timeout_does_not_panic() {
        let mut cfg = AppConfig::default();
        for secs in [1e30, -1.0, f64::NAN] {
            cfg.control.timeout_secs = secs;
            assert_eq!(RunnerSpec::new("w").with_config(&cfg).timeout, None);
        }
    }
}
