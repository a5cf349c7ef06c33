//! Schema module - Configuration, validation and result types for layout searches.

mod config;
mod evolution;

pub use config::*;
pub use evolution::*;
