mod comparison;
mod history;
pub mod settings;
mod stats;

pub use comparison::*;
pub use history::*;
pub use settings::{KeyValueStore, Settings};
pub use stats::*;
