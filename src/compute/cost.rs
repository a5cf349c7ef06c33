//! Turbine cost model.
//!
//! Non-dimensional cost of a farm with `n` turbines:
//!
//! ```text
//! cost(n) = n * (2/3 + 1/3 * exp(-0.00174 * n^2))
//! ```
//!
//! A single turbine costs one unit; large farms approach two thirds of a unit
//! per turbine.

const SCALE_DECAY: f64 = 0.00174;

/// Cost of building `turbines` turbines.
pub fn farm_cost(turbines: usize) -> f64 {
    let n = turbines as f64;
    n * (2.0 / 3.0 + (1.0 / 3.0) * (-SCALE_DECAY * n * n).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_one() {
        assert_eq!(farm_cost(0), 0.0);
        assert!((farm_cost(1) - (2.0 / 3.0 + (-SCALE_DECAY).exp() / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_marginal_cost_approaches_two_thirds() {
        let per_turbine = |n: usize| farm_cost(n) / n as f64;
        assert!(per_turbine(1) > per_turbine(10));
        assert!(per_turbine(10) > per_turbine(50));
        assert!((per_turbine(200) - 2.0 / 3.0).abs() < 1e-9);
        assert!((farm_cost(501) - farm_cost(500) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_cost_grows_with_count() {
        for n in 1..300 {
            assert!(farm_cost(n + 1) > farm_cost(n));
        }
    }
}
