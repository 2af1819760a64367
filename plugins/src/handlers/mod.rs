pub mod debug;
pub mod emitter;
pub mod recorder;

pub use debug::DiagnosticFormatter;
pub use emitter::StreamEmitter;
pub use recorder::ExitRecorder;
