//! 5×5 symbol grid and coordinate helpers

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::{Symbol, SymbolTable};

/// Grid rows
pub const GRID_ROWS: usize = 5;
/// Grid columns
pub const GRID_COLS: usize = 5;
/// Total cells (row-major)
pub const GRID_SIZE: usize = GRID_ROWS * GRID_COLS;

/// Row/column position of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub row: usize,
    pub col: usize,
}

/// Convert a row-major cell index to coordinates
pub fn index_to_coords(index: usize) -> Coords {
    Coords {
        row: index / GRID_COLS,
        col: index % GRID_COLS,
    }
}

/// Convert coordinates to a row-major cell index
pub fn coords_to_index(row: usize, col: usize) -> usize {
    row * GRID_COLS + col
}

/// Exactly [`GRID_SIZE`] symbols in row-major order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct Grid {
    cells: Vec<Symbol>,
}

impl Grid {
    /// Build a grid from row-major cells
    pub fn from_cells(cells: Vec<Symbol>) -> SlotResult<Self> {
        if cells.len() != GRID_SIZE {
            return Err(SlotError::InvalidGridSize {
                expected: GRID_SIZE,
                got: cells.len(),
            });
        }
        Ok(Self { cells })
    }

    /// Build a grid from row slices (top row first)
    pub fn from_rows(rows: [[Symbol; GRID_COLS]; GRID_ROWS]) -> Self {
        Self {
            cells: rows.into_iter().flatten().collect(),
        }
    }

    /// Fill every cell with an independent weighted draw
    pub fn random<R: Rng + ?Sized>(table: &SymbolTable, rng: &mut R) -> Self {
        Self {
            cells: (0..GRID_SIZE).map(|_| table.draw(rng)).collect(),
        }
    }

    /// Symbol at a cell index
    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.cells.get(index)
    }

    /// Symbol at a row/column
    pub fn at(&self, row: usize, col: usize) -> Option<&Symbol> {
        if row >= GRID_ROWS || col >= GRID_COLS {
            return None;
        }
        self.cells.get(coords_to_index(row, col))
    }

    /// Replace the symbol at a row/column, returning the previous one
    pub fn set(&mut self, row: usize, col: usize, symbol: Symbol) -> Option<Symbol> {
        if row >= GRID_ROWS || col >= GRID_COLS {
            return None;
        }
        let slot = &mut self.cells[coords_to_index(row, col)];
        Some(std::mem::replace(slot, symbol))
    }

    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.cells.iter()
    }

    /// One row, left to right
    pub fn row(&self, row: usize) -> &[Symbol] {
        let start = row * GRID_COLS;
        &self.cells[start..start + GRID_COLS]
    }
}

impl TryFrom<Vec<Symbol>> for Grid {
    type Error = SlotError;

    fn try_from(cells: Vec<Symbol>) -> SlotResult<Self> {
        Self::from_cells(cells)
    }
}

impl From<Grid> for Vec<Symbol> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}

impl std::ops::Index<usize> for Grid {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Symbol {
        &self.cells[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn uniform_grid(name: &str) -> Grid {
        let symbol = SymbolTable::standard().get(name).cloned().unwrap();
        Grid::from_cells(vec![symbol; GRID_SIZE]).unwrap()
    }

    #[test]
    fn test_coords_roundtrip() {
        for index in 0..GRID_SIZE {
            let c = index_to_coords(index);
            assert_eq!(coords_to_index(c.row, c.col), index);
        }
        assert_eq!(index_to_coords(12), Coords { row: 2, col: 2 });
        assert_eq!(coords_to_index(4, 0), 20);
    }

    #[test]
    fn test_from_cells_checks_size() {
        let symbol = SymbolTable::standard().get("Gear").cloned().unwrap();
        assert!(matches!(
            Grid::from_cells(vec![symbol; 24]),
            Err(SlotError::InvalidGridSize { expected: 25, got: 24 })
        ));
    }

    #[test]
    fn test_random_grid_is_reproducible() {
        let table = SymbolTable::standard();
        let a = Grid::random(&table, &mut StdRng::seed_from_u64(42));
        let b = Grid::random(&table, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.cells().len(), GRID_SIZE);
    }

    #[test]
    fn test_set_and_at() {
        let mut grid = uniform_grid("Gear");
        let crystal = SymbolTable::standard().get("Crystal").cloned().unwrap();

        let previous = grid.set(1, 3, crystal.clone()).unwrap();
        assert_eq!(previous.name, "Gear");
        assert_eq!(grid.at(1, 3), Some(&crystal));
        assert_eq!(grid[8].name, "Crystal");
        assert!(grid.at(5, 0).is_none());
        assert!(grid.set(0, 5, crystal).is_none());
    }
}
