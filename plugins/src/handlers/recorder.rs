use linetrace_core::api::{Event, Handler, HandlerError};

/// Remembers how the worker ended. Every event is passed through untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExitRecorder {
    exitstatus: Option<i32>,
    timeout_seconds: Option<f64>,
}

impl ExitRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exitstatus(&self) -> Option<i32> {
        self.exitstatus
    }

    pub fn timeout_seconds(&self) -> Option<f64> {
        self.timeout_seconds
    }

    pub fn timed_out(&self) -> bool {
        self.timeout_seconds.is_some()
    }
}

impl Handler for ExitRecorder {
    fn name(&self) -> &'static str {
        "exit_recorder"
    }

    fn observe(&mut self, ev: &Event) -> Result<(), HandlerError> {
        match ev {
            Event::Exitstatus { value } => self.exitstatus = Some(*value),
            Event::Timeout { seconds } => self.timeout_seconds = Some(*seconds),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let r = ExitRecorder::new();
        assert_eq!(r.exitstatus(), None);
        assert_eq!(r.timeout_seconds(), None);
        assert!(!r.timed_out());
    }

    #[test]
    fn records_exit_and_timeout_independently() {
        let mut r = ExitRecorder::new();
        r.observe(&Event::stdout("noise")).unwrap();
        r.observe(&Event::Exitstatus { value: 1 }).unwrap();
        assert_eq!(r.exitstatus(), Some(1));
        assert_eq!(r.timeout_seconds(), None);

        r.observe(&Event::Timeout { seconds: 2.5 }).unwrap();
        r.observe(&Event::Exitstatus { value: -9 }).unwrap();
        assert_eq!(r.exitstatus(), Some(-9));
        assert_eq!(r.timeout_seconds(), Some(2.5));
    }
}
