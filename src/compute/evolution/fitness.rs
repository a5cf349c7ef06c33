//! Fitness evaluation and ranking of layouts.

use std::cmp::Ordering;

use crate::compute::{Grid, Layout, PowerModel, farm_cost};
use crate::schema::{LayoutSnapshot, LayoutVariant};

/// How evaluated layouts are scored and ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessPolicy {
    /// Fitness is farm power; higher is better.
    MaximizePower,
    /// Fitness is cost divided by power; lower is better.
    MinimizeCostPowerRatio,
}

impl FitnessPolicy {
    /// Policy matching a turbine-count regime.
    pub fn for_variant(variant: &LayoutVariant) -> Self {
        match variant {
            LayoutVariant::VariableCount => Self::MinimizeCostPowerRatio,
            LayoutVariant::FixedCount { .. } => Self::MaximizePower,
        }
    }

    /// Score a layout.
    pub fn evaluate<M>(self, layout: Layout, model: &M) -> LayoutEvaluation
    where
        M: PowerModel + ?Sized,
    {
        let turbine_count = layout.turbine_count();
        let power = model.farm_power(&layout);

        let (cost, cost_power_ratio, fitness) = match self {
            Self::MaximizePower => (None, None, power),
            Self::MinimizeCostPowerRatio => {
                let cost = farm_cost(turbine_count);
                let ratio = if power > 0.0 {
                    cost / power
                } else {
                    f64::INFINITY
                };
                (Some(cost), Some(ratio), ratio)
            }
        };

        LayoutEvaluation {
            layout,
            turbine_count,
            power,
            cost,
            cost_power_ratio,
            fitness,
        }
    }

    /// Order two fitness values so that the better one sorts first.
    #[inline]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::MaximizePower => b.total_cmp(&a),
            Self::MinimizeCostPowerRatio => a.total_cmp(&b),
        }
    }

    /// Whether `a` is strictly better than `b`.
    #[inline]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Sort a population best-first. Ties keep their order.
    pub fn rank(self, population: &mut [LayoutEvaluation]) {
        population.sort_by(|a, b| self.compare(a.fitness, b.fitness));
    }
}

/// A layout together with the values derived from it.
///
/// The derived values are only ever produced by [`FitnessPolicy::evaluate`],
/// so they always match the occupancy.
#[derive(Debug, Clone)]
pub struct LayoutEvaluation {
    layout: Layout,
    turbine_count: usize,
    power: f64,
    cost: Option<f64>,
    cost_power_ratio: Option<f64>,
    fitness: f64,
}

impl LayoutEvaluation {
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Give back the occupancy, dropping the derived values.
    pub fn into_layout(self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn turbine_count(&self) -> usize {
        self.turbine_count
    }

    /// Farm power in kW.
    #[inline]
    pub fn power(&self) -> f64 {
        self.power
    }

    #[inline]
    pub fn cost(&self) -> Option<f64> {
        self.cost
    }

    #[inline]
    pub fn cost_power_ratio(&self) -> Option<f64> {
        self.cost_power_ratio
    }

    /// Ranking key under the policy that produced this evaluation.
    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Power of the same turbines with no wake losses.
    pub fn max_power(&self, turbine_power: f64) -> f64 {
        self.turbine_count as f64 * turbine_power
    }

    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self, grid: &Grid, turbine_power: f64) -> LayoutSnapshot {
        let max_power = self.max_power(turbine_power);
        let efficiency = if max_power > 0.0 {
            self.power / max_power
        } else {
            0.0
        };

        LayoutSnapshot {
            cells: self.layout.cells().to_vec(),
            columns: self.layout.column_divide(grid.rows()),
            turbine_count: self.turbine_count,
            power: self.power,
            cost: self.cost,
            cost_power_ratio: self.cost_power_ratio,
            fitness: self.fitness,
            max_power,
            efficiency,
        }
    }
}
