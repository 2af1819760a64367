pub mod load;
pub mod types;

pub use load::{load_default, load_from, validate, DEFAULT_CONFIG_FILE};
pub use types::*;
