//! Grid geometry: maps farm dimensions onto a column-major cell grid.
//!
//! Cells are numbered column by column, with the row index varying fastest.
//! Each column is one line of cells aligned with the prevailing wind, so a
//! lower row index within a column is upstream of a higher one.

use serde::{Deserialize, Serialize};

use crate::schema::FarmConfig;

/// Row/column layout of the candidate turbine sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
}

impl Grid {
    /// Largest grid a search will run on.
    pub const MAX_CELLS: usize = 1 << 24;

    /// Create a grid with explicit dimensions.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Derive the grid from farm dimensions and turbine spacing.
    pub fn from_farm(farm: &FarmConfig) -> Self {
        let rows = farm.rounding.apply(farm.height / farm.row_pitch());
        let columns = farm.rounding.apply(farm.width / farm.column_pitch());
        Self::new(rows, columns)
    }

    /// Like [`Grid::from_farm`], but `None` when the farm is too large to grid.
    ///
    /// Rejects non-finite row or column ratios and grids with more than
    /// [`Grid::MAX_CELLS`] cells.
    pub fn checked_from_farm(farm: &FarmConfig) -> Option<Self> {
        let row_ratio = farm.height / farm.row_pitch();
        let column_ratio = farm.width / farm.column_pitch();
        if !row_ratio.is_finite() || !column_ratio.is_finite() {
            return None;
        }
        let grid = Self::new(
            farm.rounding.apply(row_ratio),
            farm.rounding.apply(column_ratio),
        );
        match grid.checked_cell_count() {
            Some(cells) if cells <= Self::MAX_CELLS => Some(grid),
            _ => None,
        }
    }

    /// Cells per column (along the wind).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of wind-aligned columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Total number of cells, or `None` on overflow.
    #[inline]
    pub fn checked_cell_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.columns)
    }

    /// Flat index of the cell at `(column, row)`.
    #[inline]
    pub fn index(&self, column: usize, row: usize) -> usize {
        debug_assert!(column < self.columns && row < self.rows);
        column * self.rows + row
    }

    /// `(column, row)` of a flat index.
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.cell_count());
        (index / self.rows, index % self.rows)
    }
}
