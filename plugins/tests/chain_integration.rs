//! Full auxiliary chain in front of the result builder.

use linetrace_core::api::{
    decode_all, drain_blocking, encode, drain_events, Event, EventCodec, EventsOutFormat,
    HandlerChain, ResultBuilder,
};
use linetrace_plugins::handlers::{DiagnosticFormatter, ExitRecorder, StreamEmitter};
use pretty_assertions::assert_eq;

fn run_events() -> Vec<Event> {
    vec![
        Event::Exec,
        Event::ToolVersion {
            value: "0.1.0".into(),
        },
        Event::line_result(1, "value", "3"),
        Event::stdout("hi\n"),
        Event::exception(
            2,
            "RuntimeError",
            "boom",
            vec!["main.rb:2".into(), "main.rb:1".into()],
        ),
        Event::StdoutClosed,
        Event::StderrClosed,
        Event::EventStreamClosed,
        Event::Exitstatus { value: 1 },
        Event::Finished,
    ]
}

#[test]
fn every_handler_sees_the_same_stream() {
    let events = run_events();
    let wire: Vec<u8> = events
        .iter()
        .flat_map(|ev| encode(ev).unwrap().to_vec())
        .collect();

    let mut diagnostics = DiagnosticFormatter::new(Vec::new()).with_width(80);
    let mut recorder = ExitRecorder::new();
    let mut emitter = StreamEmitter::new(Vec::new(), EventsOutFormat::Binary);
    let mut builder = ResultBuilder::new();
    let delivered = {
        let mut chain = HandlerChain::new()
            .with(&mut diagnostics)
            .with(&mut recorder)
            .with(&mut emitter)
            .with(&mut builder);
        drain_blocking(&wire[..], EventCodec::default(), &mut chain).unwrap()
    };

    assert_eq!(delivered, events.len());
    assert_eq!(recorder.exitstatus(), Some(1));
    assert!(!recorder.timed_out());

    // re-emitted binary is byte-identical to what the worker sent
    assert_eq!(emitter.into_inner(), wire);

    let trace = String::from_utf8(diagnostics.into_inner()).unwrap();
    assert!(trace.starts_with("exec"));
    assert!(trace.contains("class_name=\"RuntimeError\""));
    assert!(trace.trim_end().ends_with('|'));

    let result = builder.finish();
    assert!(result.has_exception());
    assert_eq!(result.exitstatus(), Some(1));
    assert_eq!(result.tool_version(), Some("0.1.0"));
}

#[test]
fn jsonl_reemission_from_already_decoded_events() {
    let events = run_events();
    let mut emitter = StreamEmitter::new(Vec::new(), EventsOutFormat::Jsonl);
    let mut recorder = ExitRecorder::new();
    {
        let mut chain = HandlerChain::new().with(&mut recorder).with(&mut emitter);
        let n = drain_events(
            events.iter().cloned().map(Ok::<_, linetrace_core::api::ProtocolError>),
            &mut chain,
        )
        .unwrap();
        assert_eq!(n, events.len());
    }
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(text.lines().count(), events.len());
    assert!(text.lines().all(|l| l.starts_with("{\"kind\":")));

    // JSONL is never mistaken for frames
    assert!(decode_all(text.as_bytes()).is_err());
}
