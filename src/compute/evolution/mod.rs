//! Evolutionary search for wind farm layouts.
//!
//! # Overview
//!
//! The search is split into:
//!
//! - **Fitness** (`fitness`): scoring and ranking layouts by power or by cost per kW
//! - **Genome Operations** (`genome`): random layouts, crossover, and mutation
//! - **Search** (`search`): the generational loop and its stopping rule
//!
//! # Example
//!
//! ```rust,no_run
//! use windfarm_ga::compute::evolution::EvolutionEngine;
//! use windfarm_ga::schema::EvolutionConfig;
//!
//! let config = EvolutionConfig::fixed_count();
//! let mut engine = EvolutionEngine::new(config).expect("valid configuration");
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best fitness = {:.4}",
//!         progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best power: {:.1} kW", result.best.power);
//! ```
//!
//! # Turbine-count regimes
//!
//! - `VariableCount`: layouts are ranked by cost per kW (lower is better);
//!   crossover swaps tail halves and mutation flips one cell.
//! - `FixedCount`: layouts are ranked by power (higher is better); crossover
//!   trades one turbine between parents and mutation moves one turbine.

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessPolicy, LayoutEvaluation};
pub use genome::{LayoutRng, VariationPolicy};
pub use search::EvolutionEngine;
