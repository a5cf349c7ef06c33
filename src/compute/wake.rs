//! Wake power model.
//!
//! Every grid column is an independent line of cells aligned with the wind.
//! The first turbine in a column sees the free-stream speed. Each later
//! turbine sees the speed of its nearest upstream turbine, reduced by a
//! Jensen-style top-hat wake deficit that weakens with the distance between
//! the two rotors:
//!
//! ```text
//! v = v_up * (1 - 2a * (R / (R + k * S * d))^2)
//! ```
//!
//! where `a` is the axial induction factor, `R` the rotor radius, `k` the
//! entrainment constant, `S` the row pitch and `d` the number of rows between
//! the two turbines. Deficits compound along a column through the nearest
//! upstream rotor only. Speeds below cut-in are clamped to zero.

use std::f64::consts::PI;

use crate::schema::{EvolutionConfig, FarmConfig, TurbineConfig};

use super::{Grid, Layout};

/// Anything that can score a layout in kW.
///
/// Implementations must be pure functions of the layout so that a population
/// can be evaluated in parallel.
pub trait PowerModel: Sync {
    /// Total farm power of a layout (kW).
    fn farm_power(&self, layout: &Layout) -> f64;

    /// Power of a single turbine in undisturbed wind (kW).
    fn free_stream_turbine_power(&self) -> f64;
}

/// Physical wake model over a fixed grid.
#[derive(Debug, Clone)]
pub struct WakeModel {
    grid: Grid,
    rotor_radius: f64,
    row_pitch: f64,
    axial_induction: f64,
    /// `0.5 * Cp * rho * swept area / 1000`, so power is `coefficient * v^3` in kW.
    power_coefficient: f64,
    entrainment_constant: f64,
    cut_in_wind_speed: f64,
    free_stream_speed: f64,
}

impl WakeModel {
    /// Create a wake model for a grid.
    pub fn new(grid: Grid, farm: &FarmConfig, turbine: &TurbineConfig) -> Self {
        let swept_area = PI * farm.rotor_diameter.powi(2) / 4.0;
        Self {
            grid,
            rotor_radius: farm.rotor_diameter / 2.0,
            row_pitch: farm.row_pitch(),
            axial_induction: turbine.axial_induction_factor(),
            power_coefficient: 0.5 * turbine.power_coefficient * turbine.air_density * swept_area
                / 1000.0,
            entrainment_constant: turbine.entrainment_constant,
            cut_in_wind_speed: turbine.cut_in_wind_speed,
            free_stream_speed: turbine.average_wind_speed,
        }
    }

    /// Create a wake model from a run configuration.
    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self::new(config.grid(), &config.farm, &config.turbine)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Power produced at a given wind speed (kW).
    #[inline]
    pub fn turbine_power(&self, speed: f64) -> f64 {
        self.power_coefficient * speed.powi(3)
    }

    /// Speed behind an upstream rotor `distance` rows away.
    pub fn wake_speed(&self, upstream_speed: f64, distance: usize) -> f64 {
        let expansion = self.rotor_radius
            / (self.rotor_radius + self.entrainment_constant * self.row_pitch * distance as f64);
        let speed = upstream_speed * (1.0 - 2.0 * self.axial_induction * expansion.powi(2));
        if speed < self.cut_in_wind_speed {
            0.0
        } else {
            speed
        }
    }

    /// Wind speed at each turbine of one column, in upstream-to-downstream order.
    ///
    /// # Panics
    ///
    /// Panics if a cell is neither 0 nor 1.
    pub fn column_speeds(&self, column: &[u8]) -> Vec<f64> {
        let mut speeds = Vec::new();
        let mut upstream: Option<(usize, f64)> = None;

        for (row, &cell) in column.iter().enumerate() {
            match cell {
                0 => continue,
                1 => {}
                other => panic!("cell {row} holds {other}, expected 0 or 1"),
            }
            let speed = match upstream {
                None => self.free_stream_speed,
                Some((upstream_row, upstream_speed)) => {
                    self.wake_speed(upstream_speed, row - upstream_row)
                }
            };
            speeds.push(speed);
            upstream = Some((row, speed));
        }

        speeds
    }

    /// Wind speed at every turbine, grouped by column.
    ///
    /// # Panics
    ///
    /// Panics if the layout does not cover the grid exactly.
    pub fn turbine_speeds(&self, layout: &Layout) -> Vec<Vec<f64>> {
        self.check_layout(layout);
        layout
            .columns(self.grid.rows())
            .map(|column| self.column_speeds(column))
            .collect()
    }

    fn check_layout(&self, layout: &Layout) {
        assert_eq!(
            layout.len(),
            self.grid.cell_count(),
            "layout length does not match the {}x{} grid",
            self.grid.rows(),
            self.grid.columns()
        );
    }
}

impl PowerModel for WakeModel {
    /// # Panics
    ///
    /// Panics if the layout does not cover the grid exactly.
    fn farm_power(&self, layout: &Layout) -> f64 {
        self.check_layout(layout);
        let total: f64 = layout
            .columns(self.grid.rows())
            .flat_map(|column| self.column_speeds(column))
            .map(|speed| self.turbine_power(speed))
            .sum();
        round_to(total, 4)
    }

    fn free_stream_turbine_power(&self) -> f64 {
        self.turbine_power(self.free_stream_speed)
    }
}

/// Round to `decimals` places, ties to even.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}
