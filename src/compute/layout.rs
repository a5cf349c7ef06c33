//! Layout encoding: a flat binary occupancy buffer over the grid.

use std::slice::Chunks;

use serde::Serialize;

use super::Grid;

/// Errors raised when building a layout from raw cells.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has {actual} cells but the grid has {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("cell {index} holds {value}; occupancy must be 0 or 1")]
    NonBinary { index: usize, value: u8 },
}

/// Turbine occupancy per cell (1 = turbine), in column-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Layout {
    cells: Vec<u8>,
}

impl Layout {
    /// Build a layout, checking it against the grid.
    pub fn from_cells(cells: Vec<u8>, grid: &Grid) -> Result<Self, LayoutError> {
        if cells.len() != grid.cell_count() {
            return Err(LayoutError::LengthMismatch {
                expected: grid.cell_count(),
                actual: cells.len(),
            });
        }
        if let Some((index, &value)) = cells.iter().enumerate().find(|(_, v)| **v > 1) {
            return Err(LayoutError::NonBinary { index, value });
        }
        Ok(Self { cells })
    }

    /// A layout with no turbines.
    pub fn empty(cell_count: usize) -> Self {
        Self {
            cells: vec![0; cell_count],
        }
    }

    /// A layout whose first `turbines` cells are occupied.
    pub(crate) fn packed(cell_count: usize, turbines: usize) -> Self {
        let mut cells = vec![0; cell_count];
        cells[..turbines.min(cell_count)].fill(1);
        Self { cells }
    }

    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.cells[index] == 1
    }

    /// Number of occupied cells.
    pub fn turbine_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }

    /// Flip one cell between empty and occupied.
    #[inline]
    pub fn toggle(&mut self, index: usize) {
        self.cells[index] ^= 1;
    }

    /// Set one cell.
    #[inline]
    pub fn set(&mut self, index: usize, occupied: bool) {
        self.cells[index] = u8::from(occupied);
    }

    /// Indices of empty cells.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.indices_where(0)
    }

    /// Indices of occupied cells.
    pub fn occupied_indices(&self) -> Vec<usize> {
        self.indices_where(1)
    }

    fn indices_where(&self, value: u8) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == value)
            .map(|(i, _)| i)
            .collect()
    }

    /// Wind-aligned columns as borrowed slices of `rows` cells each.
    pub fn columns(&self, rows: usize) -> Chunks<'_, u8> {
        self.cells.chunks(rows)
    }

    /// Split into one owned sequence per column.
    pub fn column_divide(&self, rows: usize) -> Vec<Vec<u8>> {
        self.columns(rows).map(<[u8]>::to_vec).collect()
    }
}

/// Concatenate column sequences back into a flat occupancy vector.
pub fn flatten(columns: &[Vec<u8>]) -> Vec<u8> {
    columns.concat()
}
