use crate::error::HandlerError;
use crate::event::Event;

use super::Handler;

/// Ordered list of borrowed handlers, invoked front to back for each event.
///
/// The chain borrows its handlers so the caller keeps ownership and can query
/// each one (recorded exit status, built result, ...) once the chain is
/// dropped. A chain is itself a [`Handler`], so chains nest.
///
/// If a handler fails, the event is not delivered to the handlers after it and
/// the error is returned to the driver.
#[derive(Default)]
pub struct HandlerChain<'a> {
    handlers: Vec<&'a mut dyn Handler>,
}

impl<'a> HandlerChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: &'a mut dyn Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn push(&mut self, handler: &'a mut dyn Handler) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl Handler for HandlerChain<'_> {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn observe(&mut self, ev: &Event) -> Result<(), HandlerError> {
        for handler in self.handlers.iter_mut() {
            if let Err(e) = handler.observe(ev) {
                tracing::error!(
                    target: "linetrace.chain",
                    handler = handler.name(),
                    kind = %ev.kind(),
                    error = %e,
                    "handler failed, event not forwarded further"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Tape {
        seen: Vec<Event>,
    }

    impl Handler for Tape {
        fn name(&self) -> &'static str {
            "tape"
        }

        fn observe(&mut self, ev: &Event) -> Result<(), HandlerError> {
            self.seen.push(ev.clone());
            Ok(())
        }
    }

    struct Broken;

    impl Handler for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn observe(&mut self, _ev: &Event) -> Result<(), HandlerError> {
            Err(HandlerError::Sink {
                handler: "broken",
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"),
            })
        }
    }

    #[test]
    fn every_handler_sees_every_event_once_in_order() {
        let events = vec![
            Event::line_result(1, "value", "3"),
            Event::stdout("hi"),
            Event::line_result(1, "value", "4"),
            Event::Finished,
        ];
        let (mut a, mut b, mut c) = (Tape::default(), Tape::default(), Tape::default());
        {
            let mut chain = HandlerChain::new().with(&mut a).with(&mut b).with(&mut c);
            assert_eq!(chain.names(), vec!["tape", "tape", "tape"]);
            for ev in &events {
                chain.observe(ev).unwrap();
            }
        }
        assert_eq!(a.seen, events);
        assert_eq!(b.seen, events);
        assert_eq!(c.seen, events);
    }

    #[test]
    fn failure_stops_forwarding() {
        let (mut before, mut broken, mut after) = (Tape::default(), Broken, Tape::default());
        {
            let mut chain = HandlerChain::new();
            chain.push(&mut before).push(&mut broken).push(&mut after);
            assert!(chain.observe(&Event::Exec).is_err());
        }
        assert_eq!(before.seen, vec![Event::Exec]);
        assert!(after.seen.is_empty());
    }

    #[test]
    fn chains_nest() {
        let (mut inner_tape, mut outer_tape) = (Tape::default(), Tape::default());
        {
            let mut inner = HandlerChain::new().with(&mut inner_tape);
            let mut outer = HandlerChain::new().with(&mut inner).with(&mut outer_tape);
            outer.observe(&Event::StdoutClosed).unwrap();
        }
        assert_eq!(inner_tape.seen, vec![Event::StdoutClosed]);
        assert_eq!(outer_tape.seen, vec![Event::StdoutClosed]);
    }
}
