use crate::error::HandlerError;
use crate::event::Event;

/// A consumer on the handler chain.
///
/// Handlers receive every event by shared reference, so no handler can alter
/// what the next one sees. State lives inside the handler and is not shared
/// with siblings.
pub trait Handler: Send {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    fn observe(&mut self, ev: &Event) -> Result<(), HandlerError>;
}
