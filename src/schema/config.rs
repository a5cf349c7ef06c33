//! Configuration types for the farm geometry and turbine physics.

use serde::{Deserialize, Serialize};

/// How fractional row/column counts are turned into whole cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GridRounding {
    /// Round to the nearest whole cell.
    #[default]
    Round,
    /// Always round up, so the grid covers the whole farm.
    Ceil,
}

impl GridRounding {
    /// Apply the rounding mode to a fractional cell count.
    #[inline]
    pub fn apply(self, value: f64) -> usize {
        let rounded = match self {
            Self::Round => value.round(),
            Self::Ceil => value.ceil(),
        };
        rounded.max(0.0) as usize
    }
}

/// Farm dimensions and turbine spacing.
///
/// Rows run along the vertical axis (the wind direction), columns along the
/// horizontal axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Horizontal farm size in meters.
    pub width: f64,
    /// Vertical farm size in meters.
    pub height: f64,
    /// Rotor diameter in meters.
    pub rotor_diameter: f64,
    /// Column pitch in rotor diameters.
    pub horizontal_spacing: f64,
    /// Row pitch in rotor diameters (the wake direction).
    pub vertical_spacing: f64,
    /// Rounding applied when deriving row and column counts.
    #[serde(default)]
    pub rounding: GridRounding,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            width: 8000.0,
            height: 3400.0,
            rotor_diameter: 126.0,
            horizontal_spacing: 2.0,
            vertical_spacing: 4.0,
            rounding: GridRounding::Round,
        }
    }
}

impl FarmConfig {
    /// Row pitch in meters.
    #[inline]
    pub fn row_pitch(&self) -> f64 {
        self.vertical_spacing * self.rotor_diameter
    }

    /// Column pitch in meters.
    #[inline]
    pub fn column_pitch(&self) -> f64 {
        self.horizontal_spacing * self.rotor_diameter
    }

    /// Whether every length is strictly positive.
    pub fn has_positive_geometry(&self) -> bool {
        [
            self.width,
            self.height,
            self.rotor_diameter,
            self.horizontal_spacing,
            self.vertical_spacing,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Turbine and site physics feeding the wake and power models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurbineConfig {
    /// Wake expansion rate.
    pub entrainment_constant: f64,
    /// Rotor thrust coefficient (0.0-1.0).
    pub thrust_coefficient: f64,
    /// Speeds below this produce no power (m/s).
    pub cut_in_wind_speed: f64,
    /// Rated wind speed (m/s). Reported only.
    pub rated_wind_speed: f64,
    /// Free-stream wind speed (m/s).
    pub average_wind_speed: f64,
    /// Air density (kg/m^3).
    pub air_density: f64,
    /// Rotor power coefficient.
    pub power_coefficient: f64,
}

impl Default for TurbineConfig {
    fn default() -> Self {
        Self {
            entrainment_constant: 0.04,
            thrust_coefficient: 0.65,
            cut_in_wind_speed: 5.0,
            rated_wind_speed: 11.4,
            average_wind_speed: 9.2,
            air_density: 1.225,
            power_coefficient: 0.442,
        }
    }
}

impl TurbineConfig {
    /// Axial induction factor derived from the thrust coefficient.
    #[inline]
    pub fn axial_induction_factor(&self) -> f64 {
        0.5 * (1.0 - (1.0 - self.thrust_coefficient).sqrt())
    }
}
