//! Wind farm layout optimization.
//!
//! This crate searches for turbine placements on a discretized farm grid that
//! maximize power, or minimize cost per kW, under wake interference between
//! turbines, using a genetic algorithm.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, validation and result types
//! - `compute`: Grid geometry, layout encoding, wake and cost models, and the search
//!
//! # Example
//!
//! ```rust,no_run
//! use windfarm_ga::{EvolutionConfig, EvolutionEngine};
//!
//! let config = EvolutionConfig::default();
//! let mut engine = EvolutionEngine::new(config).expect("valid configuration");
//! let result = engine.run();
//!
//! println!(
//!     "{} turbines, {:.1} kW after {} generations",
//!     result.best.turbine_count, result.best.power, result.stats.generations
//! );
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::EvolutionEngine;
pub use compute::{Grid, Layout, PowerModel, WakeModel};
pub use schema::{EvolutionConfig, EvolutionResult, LayoutVariant};
