//! Property-based tests for windfarm-ga
//!
//! Uses proptest to verify layout invariants across operators and the wake model.

use proptest::prelude::*;
use windfarm_ga::{
    Grid, Layout, PowerModel, WakeModel,
    compute::{
        evolution::{LayoutRng, VariationPolicy},
        flatten,
    },
    schema::{FarmConfig, LayoutVariant, TurbineConfig},
};

fn is_binary(layout: &Layout) -> bool {
    layout.cells().iter().all(|&c| c <= 1)
}

fn wake_model(rows: usize, columns: usize) -> WakeModel {
    let farm = FarmConfig {
        width: 100.0 * columns as f64,
        height: 100.0 * rows as f64,
        rotor_diameter: 100.0,
        horizontal_spacing: 1.0,
        vertical_spacing: 1.0,
        ..Default::default()
    };
    WakeModel::new(Grid::new(rows, columns), &farm, &TurbineConfig::default())
}

proptest! {
    // ==================== Layout Encoding ====================

    #[test]
    fn column_divide_roundtrip(rows in 1usize..8, columns in 1usize..8, seed in any::<u64>()) {
        let grid = Grid::new(rows, columns);
        let mut rng = LayoutRng::new(seed);
        let layout = rng.random_layout(&LayoutVariant::VariableCount, grid.cell_count());

        let divided = layout.column_divide(rows);
        prop_assert_eq!(divided.len(), columns);
        prop_assert!(divided.iter().all(|c| c.len() == rows));
        prop_assert_eq!(flatten(&divided), layout.cells().to_vec());
    }

    #[test]
    fn from_cells_accepts_binary(cells in prop::collection::vec(0u8..=1, 1..64)) {
        let grid = Grid::new(1, cells.len());
        let layout = Layout::from_cells(cells.clone(), &grid).unwrap();
        prop_assert_eq!(layout.turbine_count(), cells.iter().filter(|&&c| c == 1).count());
    }

    // ==================== Random Layouts ====================

    #[test]
    fn random_fixed_layout_has_exact_count(cells in 2usize..200, frac in 0.0f64..1.0, seed in any::<u64>()) {
        let turbines = ((cells as f64 * frac) as usize).clamp(1, cells);
        let mut rng = LayoutRng::new(seed);
        let layout = rng.random_layout(&LayoutVariant::FixedCount { turbine_count: turbines }, cells);
        prop_assert_eq!(layout.len(), cells);
        prop_assert!(is_binary(&layout));
        prop_assert_eq!(layout.turbine_count(), turbines);
    }

    #[test]
    fn random_free_layout_never_fills_or_empties(cells in 2usize..200, seed in any::<u64>()) {
        let mut rng = LayoutRng::new(seed);
        let layout = rng.random_layout(&LayoutVariant::VariableCount, cells);
        prop_assert!(layout.turbine_count() >= 1);
        prop_assert!(layout.turbine_count() < cells);
    }

    // ==================== Operators ====================

    #[test]
    fn count_preserving_operators_keep_count(
        cells in 2usize..100,
        frac in 0.0f64..1.0,
        rounds in 1usize..20,
        seed in any::<u64>()
    ) {
        let turbines = ((cells as f64 * frac) as usize).clamp(1, cells);
        let variant = LayoutVariant::FixedCount { turbine_count: turbines };
        let mut rng = LayoutRng::new(seed);
        let mut layouts: Vec<Layout> = (0..4).map(|_| rng.random_layout(&variant, cells)).collect();

        for _ in 0..rounds {
            VariationPolicy::CountPreserving.recombine(&mut rng, &mut layouts);
        }
        for layout in &layouts {
            prop_assert_eq!(layout.len(), cells);
            prop_assert!(is_binary(layout));
            prop_assert_eq!(layout.turbine_count(), turbines);
        }
    }

    #[test]
    fn free_count_operators_keep_a_turbine(
        cells in 2usize..100,
        rounds in 1usize..30,
        seed in any::<u64>()
    ) {
        let mut rng = LayoutRng::new(seed);
        let mut layouts: Vec<Layout> = (0..6)
            .map(|_| rng.random_layout(&LayoutVariant::VariableCount, cells))
            .collect();

        for _ in 0..rounds {
            VariationPolicy::FreeCount.recombine(&mut rng, &mut layouts);
            for layout in &layouts {
                prop_assert_eq!(layout.len(), cells);
                prop_assert!(is_binary(layout));
                prop_assert!(layout.turbine_count() >= 1);
            }
        }
    }

    #[test]
    fn swap_crossover_on_identical_parents_is_noop(cells in prop::collection::vec(0u8..=1, 1..64), seed in any::<u64>()) {
        let grid = Grid::new(1, cells.len());
        let mut a = Layout::from_cells(cells.clone(), &grid).unwrap();
        let mut b = a.clone();
        LayoutRng::new(seed).swap_crossover(&mut a, &mut b);
        prop_assert_eq!(a.cells(), &cells[..]);
        prop_assert_eq!(b.cells(), &cells[..]);
    }

    // ==================== Wake Model ====================

    #[test]
    fn wake_model_is_deterministic(rows in 1usize..10, columns in 1usize..10, seed in any::<u64>()) {
        let model = wake_model(rows, columns);
        let mut rng = LayoutRng::new(seed);
        let layout = rng.random_layout(&LayoutVariant::VariableCount, rows * columns);
        prop_assert_eq!(model.farm_power(&layout), model.farm_power(&layout));
    }

    #[test]
    fn wake_never_exceeds_free_stream(rows in 1usize..10, columns in 1usize..10, seed in any::<u64>()) {
        let model = wake_model(rows, columns);
        let mut rng = LayoutRng::new(seed);
        let layout = rng.random_layout(&LayoutVariant::VariableCount, rows * columns);

        let max = layout.turbine_count() as f64 * model.free_stream_turbine_power();
        prop_assert!(model.farm_power(&layout) <= max + 1e-3);

        let speeds = model.turbine_speeds(&layout);
        let counted: usize = speeds.iter().map(Vec::len).sum();
        prop_assert_eq!(counted, layout.turbine_count());
        for column in &speeds {
            prop_assert!(column.windows(2).all(|w| w[1] <= w[0]));
        }
    }
}
