//! Layout manipulation utilities for evolutionary search.
//!
//! Provides random generation, crossover, and mutation operations. Every
//! operator keeps layouts binary and the right length. The count-preserving
//! operators also keep the turbine count fixed, and the free-count operators
//! never leave a layout without turbines.

use rand::prelude::*;

use crate::compute::Layout;
use crate::schema::LayoutVariant;

/// Random number generator wrapper for layout operations.
pub struct LayoutRng {
    rng: StdRng,
}

impl LayoutRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate a random layout for a turbine-count regime.
    ///
    /// With a free count, the number of turbines is drawn uniformly from
    /// `1..=cell_count - 1`. Every arrangement of the chosen count is equally
    /// likely.
    pub fn random_layout(&mut self, variant: &LayoutVariant, cell_count: usize) -> Layout {
        let turbines = match variant.fixed_turbine_count() {
            Some(count) => count,
            None => self
                .rng
                .gen_range(1..=cell_count.saturating_sub(1).max(1)),
        };

        let mut layout = Layout::packed(cell_count, turbines);
        layout.cells_mut().shuffle(&mut self.rng);
        layout
    }

    /// Swap the tail halves of two layouts.
    ///
    /// A child left without turbines gets one on a random cell.
    pub fn midpoint_crossover(&mut self, a: &mut Layout, b: &mut Layout) {
        debug_assert_eq!(a.len(), b.len());
        let middle = a.len() / 2;
        a.cells_mut()[middle..].swap_with_slice(&mut b.cells_mut()[middle..]);

        self.repair_empty(a);
        self.repair_empty(b);
    }

    /// Trade one turbine between two layouts.
    ///
    /// Picks a cell empty in `a` but occupied in `b`, and a cell occupied in
    /// `a` but empty in `b`, then swaps both cells between the parents. Leaves
    /// the pair untouched when no such cells exist.
    pub fn swap_crossover(&mut self, a: &mut Layout, b: &mut Layout) {
        debug_assert_eq!(a.len(), b.len());
        let mut receivable = Vec::new();
        let mut givable = Vec::new();
        for (i, (&x, &y)) in a.cells().iter().zip(b.cells()).enumerate() {
            match (x, y) {
                (0, 1) => receivable.push(i),
                (1, 0) => givable.push(i),
                _ => {}
            }
        }

        let (Some(&receive), Some(&give)) = (
            receivable.choose(&mut self.rng),
            givable.choose(&mut self.rng),
        ) else {
            return;
        };

        a.set(receive, true);
        a.set(give, false);
        b.set(receive, false);
        b.set(give, true);
    }

    /// Flip one random cell, unless the layout is down to a single turbine.
    pub fn toggle_mutation(&mut self, layout: &mut Layout) {
        if layout.turbine_count() <= 1 {
            return;
        }
        let index = self.rng.gen_range(0..layout.len());
        layout.toggle(index);
    }

    /// Move one turbine: empty a random occupied cell and fill a random empty one.
    pub fn paired_toggle_mutation(&mut self, layout: &mut Layout) {
        let empty = layout.empty_indices();
        let occupied = layout.occupied_indices();
        let (Some(&fill), Some(&clear)) = (
            empty.choose(&mut self.rng),
            occupied.choose(&mut self.rng),
        ) else {
            return;
        };

        layout.toggle(fill);
        layout.toggle(clear);
    }

    /// Place one turbine on a random cell of an empty layout.
    pub fn repair_empty(&mut self, layout: &mut Layout) {
        if layout.is_empty() || layout.turbine_count() > 0 {
            return;
        }
        let index = self.rng.gen_range(0..layout.len());
        layout.set(index, true);
    }
}

/// Which crossover and mutation operators a search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationPolicy {
    /// Midpoint crossover and single-cell toggles; turbine count may drift.
    FreeCount,
    /// Turbine-trading crossover and paired toggles; turbine count is fixed.
    CountPreserving,
}

impl VariationPolicy {
    /// Policy matching a turbine-count regime.
    pub fn for_variant(variant: &LayoutVariant) -> Self {
        match variant {
            LayoutVariant::VariableCount => Self::FreeCount,
            LayoutVariant::FixedCount { .. } => Self::CountPreserving,
        }
    }

    /// Recombine a pair of layouts in place.
    pub fn crossover(self, rng: &mut LayoutRng, a: &mut Layout, b: &mut Layout) {
        match self {
            Self::FreeCount => rng.midpoint_crossover(a, b),
            Self::CountPreserving => rng.swap_crossover(a, b),
        }
    }

    /// Mutate one layout in place.
    pub fn mutate(self, rng: &mut LayoutRng, layout: &mut Layout) {
        match self {
            Self::FreeCount => rng.toggle_mutation(layout),
            Self::CountPreserving => rng.paired_toggle_mutation(layout),
        }
    }

    /// Cross consecutive pairs, then mutate every result.
    ///
    /// An odd number of layouts cannot be paired; they are left untouched and
    /// `false` is returned.
    pub fn recombine(self, rng: &mut LayoutRng, layouts: &mut [Layout]) -> bool {
        if layouts.len() % 2 != 0 {
            return false;
        }
        for pair in layouts.chunks_exact_mut(2) {
            let (first, second) = pair.split_at_mut(1);
            self.crossover(rng, &mut first[0], &mut second[0]);
        }
        for layout in layouts.iter_mut() {
            self.mutate(rng, layout);
        }
        true
    }
}
