//! Compute module - Grid geometry, wake physics and the evolutionary search.

mod cost;
mod grid;
mod layout;
mod wake;

pub mod evolution;

pub use cost::*;
pub use grid::*;
pub use layout::*;
pub use wake::*;
