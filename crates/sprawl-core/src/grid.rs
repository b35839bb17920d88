//! Fixed-size occupancy grid mapping each cell to the building on it.

use crate::geometry::Cell;
use crate::id::BuildingId;

/// Errors from grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell {0:?} is outside the grid")]
    OutOfBounds(Cell),
    #[error("cell {0:?} is occupied by {1}")]
    Occupied(Cell, BuildingId),
}

/// A square `size x size` occupancy grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    cells: Vec<Option<BuildingId>>,
}

impl Grid {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![None; (size as usize) * (size as usize)],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.y as usize * self.size as usize + cell.x as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        let size = self.size as i32;
        (0..size).contains(&cell.x) && (0..size).contains(&cell.y)
    }

    /// The building occupying `cell`, if any. Out-of-bounds cells are empty.
    pub fn building_at(&self, cell: Cell) -> Option<BuildingId> {
        self.index(cell).and_then(|i| self.cells[i])
    }

    /// In bounds and unoccupied.
    pub fn is_free(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i].is_none())
    }

    /// Check every cell without touching the grid.
    pub fn check(&self, cells: &[Cell]) -> Result<(), GridError> {
        for &cell in cells {
            let index = self.index(cell).ok_or(GridError::OutOfBounds(cell))?;
            if let Some(owner) = self.cells[index] {
                return Err(GridError::Occupied(cell, owner));
            }
        }
        Ok(())
    }

    /// Mark all `cells` as owned by `building`. All-or-nothing: if any cell
    /// is out of bounds or taken, nothing is written.
    pub fn occupy(&mut self, cells: &[Cell], building: BuildingId) -> Result<(), GridError> {
        self.check(cells)?;
        for &cell in cells {
            if let Some(index) = self.index(cell) {
                self.cells[index] = Some(building);
            }
        }
        Ok(())
    }

    /// All cells owned by `building`, in row-major order.
    pub fn cells_of(&self, building: BuildingId) -> Vec<Cell> {
        let size = self.size as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == Some(building))
            .map(|(i, _)| Cell::new((i % size) as i32, (i / size) as i32))
            .collect()
    }

    /// Total number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let grid = Grid::new(10);
        assert!(grid.in_bounds(Cell::new(0, 0)));
        assert!(grid.in_bounds(Cell::new(9, 9)));
        assert!(!grid.in_bounds(Cell::new(10, 0)));
        assert!(!grid.in_bounds(Cell::new(0, -1)));
        assert_eq!(grid.building_at(Cell::new(-5, 3)), None);
        assert!(!grid.is_free(Cell::new(10, 10)));
    }

    #[test]
    fn occupy_marks_every_cell() {
        let mut grid = Grid::new(10);
        let cells = [Cell::new(5, 5), Cell::new(6, 5), Cell::new(6, 6)];
        grid.occupy(&cells, BuildingId(1)).unwrap();

        for cell in cells {
            assert_eq!(grid.building_at(cell), Some(BuildingId(1)));
        }
        assert!(grid.is_free(Cell::new(5, 6)));
        assert_eq!(grid.occupied_count(), 3);
        assert_eq!(grid.cells_of(BuildingId(1)), cells.to_vec());
    }

    #[test]
    fn partial_overlap_writes_nothing() {
        let mut grid = Grid::new(10);
        grid.occupy(&[Cell::new(1, 1)], BuildingId(1)).unwrap();

        let result = grid.occupy(&[Cell::new(0, 1), Cell::new(1, 1)], BuildingId(2));
        assert_eq!(
            result,
            Err(GridError::Occupied(Cell::new(1, 1), BuildingId(1)))
        );
        assert!(grid.is_free(Cell::new(0, 1)));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn out_of_bounds_writes_nothing() {
        let mut grid = Grid::new(4);
        let result = grid.occupy(&[Cell::new(3, 3), Cell::new(4, 3)], BuildingId(1));
        assert_eq!(result, Err(GridError::OutOfBounds(Cell::new(4, 3))));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn zero_size_grid_has_no_cells() {
        let grid = Grid::new(0);
        assert!(!grid.in_bounds(Cell::ORIGIN));
        assert_eq!(grid.occupied_count(), 0);
    }
}
