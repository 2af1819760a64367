/// Discriminator for every event on the wire.
///
/// The tag values are part of the protocol: a worker and a supervisor built
/// from different revisions must agree on them. Adding a kind is a breaking
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    LineResult = 1,
    ResultsTruncated = 2,
    Exception = 3,
    Stdout = 4,
    Stderr = 5,
    MaxLineCaptures = 6,
    Exitstatus = 7,
    NumLines = 8,
    ToolVersion = 9,
    WorkerRuntimeVersion = 10,
    Filename = 11,
    Timeout = 12,
    Exec = 13,
    Finished = 14,
    StdoutClosed = 15,
    StderrClosed = 16,
    EventStreamClosed = 17,
}

impl EventKind {
    pub const ALL: [EventKind; 17] = [
        EventKind::LineResult,
        EventKind::ResultsTruncated,
        EventKind::Exception,
        EventKind::Stdout,
        EventKind::Stderr,
        EventKind::MaxLineCaptures,
        EventKind::Exitstatus,
        EventKind::NumLines,
        EventKind::ToolVersion,
        EventKind::WorkerRuntimeVersion,
        EventKind::Filename,
        EventKind::Timeout,
        EventKind::Exec,
        EventKind::Finished,
        EventKind::StdoutClosed,
        EventKind::StderrClosed,
        EventKind::EventStreamClosed,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        let kind = match tag {
            1 => EventKind::LineResult,
            2 => EventKind::ResultsTruncated,
            3 => EventKind::Exception,
            4 => EventKind::Stdout,
            5 => EventKind::Stderr,
            6 => EventKind::MaxLineCaptures,
            7 => EventKind::Exitstatus,
            8 => EventKind::NumLines,
            9 => EventKind::ToolVersion,
            10 => EventKind::WorkerRuntimeVersion,
            11 => EventKind::Filename,
            12 => EventKind::Timeout,
            13 => EventKind::Exec,
            14 => EventKind::Finished,
            15 => EventKind::StdoutClosed,
            16 => EventKind::StderrClosed,
            17 => EventKind::EventStreamClosed,
            _ => return None,
        };
        Some(kind)
    }

    /// Name used by the interchange form (`"kind": "..."`) and in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::LineResult => "line_result",
            EventKind::ResultsTruncated => "results_truncated",
            EventKind::Exception => "exception",
            EventKind::Stdout => "stdout",
            EventKind::Stderr => "stderr",
            EventKind::MaxLineCaptures => "max_line_captures",
            EventKind::Exitstatus => "exitstatus",
            EventKind::NumLines => "num_lines",
            EventKind::ToolVersion => "tool_version",
            EventKind::WorkerRuntimeVersion => "worker_runtime_version",
            EventKind::Filename => "filename",
            EventKind::Timeout => "timeout",
            EventKind::Exec => "exec",
            EventKind::Finished => "finished",
            EventKind::StdoutClosed => "stdout_closed",
            EventKind::StderrClosed => "stderr_closed",
            EventKind::EventStreamClosed => "event_stream_closed",
        }
    }

    /// Markers that carry no payload and never touch the result aggregate.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            EventKind::Exec
                | EventKind::Finished
                | EventKind::StdoutClosed
                | EventKind::StderrClosed
                | EventKind::EventStreamClosed
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_reversible() {
        let mut seen = std::collections::HashSet::new();
        for kind in EventKind::ALL {
            assert!(seen.insert(kind.tag()), "duplicate tag for {kind}");
            assert_eq!(EventKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn tags_outside_taxonomy_are_rejected() {
        assert_eq!(EventKind::from_tag(0), None);
        assert_eq!(EventKind::from_tag(18), None);
        assert_eq!(EventKind::from_tag(0xFF), None);
    }

    #[test]
    fn structural_markers() {
        let structural: Vec<_> = EventKind::ALL
            .iter()
            .filter(|k| k.is_structural())
            .map(|k| k.name())
            .collect();
        assert_eq!(
            structural,
            vec!["exec", "finished", "stdout_closed", "stderr_closed", "event_stream_closed"]
        );
    }
}
