pub mod interchange;
pub mod kind;
pub mod model;

pub use interchange::{from_json_line, to_json_line};
pub use kind::EventKind;
pub use model::Event;
