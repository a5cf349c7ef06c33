//! Evolution configuration types for the layout search.
//!
//! This module provides the run configuration, its validation rules, and the
//! progress and result types handed to reporting code.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FarmConfig, GridRounding, TurbineConfig};
use crate::compute::Grid;

/// Top-level configuration for a layout search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Farm geometry.
    pub farm: FarmConfig,
    /// Turbine and site physics.
    pub turbine: TurbineConfig,
    /// Whether the turbine count is free or fixed.
    #[serde(default)]
    pub variant: LayoutVariant,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Fraction of the theoretical maximum power at which the search stops.
    #[serde(default = "default_cutoff_efficiency")]
    pub cutoff_efficiency: f64,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            farm: FarmConfig::default(),
            turbine: TurbineConfig::default(),
            variant: LayoutVariant::VariableCount,
            population: PopulationConfig::default(),
            cutoff_efficiency: default_cutoff_efficiency(),
            random_seed: None,
        }
    }
}

fn default_cutoff_efficiency() -> f64 {
    0.99999
}

impl EvolutionConfig {
    /// Preset for a square farm with a fixed number of turbines.
    pub fn fixed_count() -> Self {
        Self {
            farm: FarmConfig {
                width: 2000.0,
                height: 2000.0,
                rotor_diameter: 40.0,
                horizontal_spacing: 3.0,
                vertical_spacing: 1.0,
                rounding: GridRounding::Ceil,
            },
            turbine: TurbineConfig {
                entrainment_constant: 0.09437,
                thrust_coefficient: 0.88,
                cut_in_wind_speed: 2.0,
                rated_wind_speed: 12.8,
                average_wind_speed: 12.0,
                air_density: 1.2254,
                power_coefficient: 0.4,
            },
            variant: LayoutVariant::FixedCount { turbine_count: 30 },
            ..Default::default()
        }
    }

    /// Grid derived from the farm geometry.
    pub fn grid(&self) -> Grid {
        Grid::from_farm(&self.farm)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Turbine-count regime of the search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum LayoutVariant {
    /// The search chooses how many turbines to place and ranks by cost per kW.
    #[default]
    VariableCount,
    /// Every layout carries exactly `turbine_count` turbines, ranked by power.
    FixedCount { turbine_count: usize },
}

impl LayoutVariant {
    /// Configured turbine count, if fixed.
    pub fn fixed_turbine_count(&self) -> Option<usize> {
        match self {
            Self::VariableCount => None,
            Self::FixedCount { turbine_count } => Some(*turbine_count),
        }
    }
}

/// Population settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Layouts per generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Maximum number of generations produced after generation 0.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Fraction of the ranked population carried over unchanged.
    #[serde(default = "default_elite_rate")]
    pub elite_rate: f64,
    /// Fraction of the ranked population recombined.
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            max_generations: default_max_generations(),
            elite_rate: default_elite_rate(),
            crossover_rate: default_crossover_rate(),
        }
    }
}

fn default_population_size() -> usize {
    1000
}
fn default_max_generations() -> usize {
    3000
}
fn default_elite_rate() -> f64 {
    0.1
}
fn default_crossover_rate() -> f64 {
    0.4
}

impl PopulationConfig {
    /// Number of elites carried into the next generation.
    pub fn elite_count(&self) -> usize {
        (self.size as f64 * self.elite_rate).floor() as usize
    }

    /// Number of top layouts handed to crossover.
    pub fn crossover_count(&self) -> usize {
        (self.size as f64 * self.crossover_rate).floor() as usize
    }

    /// Number of fresh random layouts per generation.
    pub fn random_count(&self) -> usize {
        (self.size as f64 * (1.0 - self.elite_rate - self.crossover_rate)).floor() as usize
    }
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Progress update emitted after each evaluated generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Generation index (0 is the random initial generation).
    pub generation: usize,
    /// Generation cap.
    pub total_generations: usize,
    /// Fitness of the best layout in this generation.
    pub best_fitness: f64,
    /// Power of the best layout in this generation (kW).
    pub best_power: f64,
    /// Turbine count of the best layout in this generation.
    pub best_turbine_count: usize,
    /// Number of layouts in this generation.
    pub population_size: usize,
}

/// Snapshot of an evaluated layout for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Flat occupancy, column-major.
    pub cells: Vec<u8>,
    /// Occupancy split into one sequence per grid column.
    pub columns: Vec<Vec<u8>>,
    /// Number of turbines.
    pub turbine_count: usize,
    /// Farm power in kW.
    pub power: f64,
    /// Cost proxy (variable-count runs only).
    pub cost: Option<f64>,
    /// Cost divided by power (variable-count runs only).
    pub cost_power_ratio: Option<f64>,
    /// Ranking key.
    pub fitness: f64,
    /// Power the same turbines would make without wake losses (kW).
    pub max_power: f64,
    /// `power / max_power`.
    pub efficiency: f64,
}

/// Evolution history for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Best fitness per generation, generation 0 included.
    pub best_fitness: Vec<f64>,
    /// Power of the best layout per generation.
    pub best_power: Vec<f64>,
}

/// Final result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best layout of the final generation.
    pub best: LayoutSnapshot,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Full history for analysis.
    pub history: EvolutionHistory,
}

/// Statistics from a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations produced beyond generation 0.
    pub generations: usize,
    /// Total layout evaluations performed.
    pub total_evaluations: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Cutoff efficiency used by the stopping rule.
    pub cutoff_efficiency: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Best layout exceeded the cutoff fraction of its theoretical maximum.
    CutoffReached,
    /// Reached the generation cap.
    MaxGenerations,
}

// ============================================================================
// Validation
// ============================================================================

/// A single broken configuration rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigViolation {
    #[error("population size must be at least 10 (got {0})")]
    PopulationTooSmall(usize),
    #[error("population size must be a multiple of 10 (got {0})")]
    PopulationNotMultipleOfTen(usize),
    #[error("generation cap must be at least 3 (got {0})")]
    TooFewGenerations(usize),
    #[error("cutoff efficiency must lie strictly between 0 and 1 (got {0})")]
    CutoffEfficiencyOutOfRange(f64),
    #[error("elite rate must lie strictly between 0 and 1 (got {0})")]
    EliteRateOutOfRange(f64),
    #[error("crossover rate must lie strictly between 0 and 1 (got {0})")]
    CrossoverRateOutOfRange(f64),
    #[error("elite rate + crossover rate must lie strictly between 0 and 1 (got {0})")]
    CombinedRateOutOfRange(f64),
    #[error("farm size, spacing and rotor diameter must be positive")]
    InvalidGeometry,
    #[error("farm geometry yields an empty grid ({rows} rows x {columns} columns)")]
    EmptyGrid { rows: usize, columns: usize },
    #[error("farm geometry yields more than {max} cells", max = Grid::MAX_CELLS)]
    GridTooLarge,
    #[error("fixed turbine count must be at least 1")]
    NoTurbines,
    #[error("turbine count {turbine_count} exceeds the {cell_count} available cells")]
    TooManyTurbines {
        turbine_count: usize,
        cell_count: usize,
    },
}

/// Every rule the configuration breaks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid configuration: {}", join_violations(.violations))]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

fn in_open_unit_interval(value: f64) -> bool {
    value > 0.0 && value < 1.0
}

impl EvolutionConfig {
    /// Validate the configuration, collecting every violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = Vec::new();
        let population = &self.population;

        if population.size < 10 {
            violations.push(ConfigViolation::PopulationTooSmall(population.size));
        }
        if population.size % 10 != 0 {
            violations.push(ConfigViolation::PopulationNotMultipleOfTen(population.size));
        }
        if population.max_generations < 3 {
            violations.push(ConfigViolation::TooFewGenerations(
                population.max_generations,
            ));
        }
        if !in_open_unit_interval(self.cutoff_efficiency) {
            violations.push(ConfigViolation::CutoffEfficiencyOutOfRange(
                self.cutoff_efficiency,
            ));
        }
        if !in_open_unit_interval(population.elite_rate) {
            violations.push(ConfigViolation::EliteRateOutOfRange(population.elite_rate));
        }
        if !in_open_unit_interval(population.crossover_rate) {
            violations.push(ConfigViolation::CrossoverRateOutOfRange(
                population.crossover_rate,
            ));
        }
        let combined = population.elite_rate + population.crossover_rate;
        if !in_open_unit_interval(combined) {
            violations.push(ConfigViolation::CombinedRateOutOfRange(combined));
        }

        if !self.farm.has_positive_geometry() {
            violations.push(ConfigViolation::InvalidGeometry);
        } else if let Some(grid) = Grid::checked_from_farm(&self.farm) {
            if grid.cell_count() == 0 {
                violations.push(ConfigViolation::EmptyGrid {
                    rows: grid.rows(),
                    columns: grid.columns(),
                });
            }
            if let Some(turbine_count) = self.variant.fixed_turbine_count() {
                if turbine_count == 0 {
                    violations.push(ConfigViolation::NoTurbines);
                } else if turbine_count > grid.cell_count() {
                    violations.push(ConfigViolation::TooManyTurbines {
                        turbine_count,
                        cell_count: grid.cell_count(),
                    });
                }
            }
        } else {
            violations.push(ConfigViolation::GridTooLarge);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { violations })
        }
    }
}
