use log::debug;

/// Side length of the drawing grid, in cells.
pub const GRID_SIZE: usize = 28;

/// Total number of cells in the grid (`GRID_SIZE * GRID_SIZE`).
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// A fixed 28×28 boolean drawing surface.
///
/// Cells are stored flat in row-major order, so cell `(row, col)` lives at
/// `row * GRID_SIZE + col`. Ink never undraws: a filled cell only returns to
/// unfilled through a full `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [bool; CELL_COUNT],
}

impl Grid {
    /// Creates an empty grid (every cell unfilled).
    pub fn new() -> Grid {
        Grid { cells: [false; CELL_COUNT] }
    }

    /// Fills cell `(row, col)`.
    ///
    /// Coordinates outside `[0, 27]` are silently dropped. Returns `true` when
    /// the cell was previously unfilled, i.e. the visible state changed.
    pub fn activate(&mut self, row: i64, col: i64) -> bool {
        let Some(idx) = Grid::index_of(row, col) else {
            return false;
        };
        if self.cells[idx] {
            return false;
        }
        self.cells[idx] = true;
        debug!("grid: filled cell ({}, {})", row, col);
        true
    }

    /// Returns every cell to unfilled.
    pub fn reset(&mut self) {
        self.cells = [false; CELL_COUNT];
    }

    /// Read-only view of the cells in row-major order.
    pub fn snapshot(&self) -> &[bool; CELL_COUNT] {
        &self.cells
    }

    /// Whether `(row, col)` is filled. Out-of-bounds coordinates read as unfilled.
    pub fn is_filled(&self, row: i64, col: i64) -> bool {
        Grid::index_of(row, col).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Iterates rows top to bottom, each as a slice of `GRID_SIZE` cells.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(GRID_SIZE)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    /// Renders the grid as ASCII art, `#` for ink and `.` for paper.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(CELL_COUNT + GRID_SIZE);
        for row in self.rows() {
            out.extend(row.iter().map(|&c| if c { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }

    fn index_of(row: i64, col: i64) -> Option<usize> {
        let size = GRID_SIZE as i64;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some((row * size + col) as usize)
        } else {
            None
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_activation_is_a_no_op() {
        let mut grid = Grid::new();
        grid.activate(3, 4);
        let before = grid.clone();

        for (row, col) in [(-1, 0), (0, -1), (28, 0), (0, 28), (28, 28), (-5, 40), (i64::MAX, 0)] {
            assert!(!grid.activate(row, col));
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn activation_fills_cell_once() {
        let mut grid = Grid::new();
        assert!(grid.activate(0, 0));
        assert!(!grid.activate(0, 0));
        assert!(grid.activate(27, 27));
        assert!(grid.is_filled(0, 0));
        assert!(grid.is_filled(27, 27));
        assert!(!grid.is_filled(1, 1));
        assert_eq!(grid.filled_count(), 2);
    }

    #[test]
    fn reset_clears_everything_and_is_idempotent() {
        let mut grid = Grid::new();
        for i in 0..GRID_SIZE as i64 {
            grid.activate(i, i);
            grid.activate(i, 27 - i);
        }
        assert!(!grid.is_empty());

        grid.reset();
        assert!(grid.snapshot().iter().all(|&c| !c));
        let once = grid.clone();
        grid.reset();
        assert_eq!(grid, once);
        assert_eq!(grid, Grid::new());
    }

    #[test]
    fn ascii_rendering_is_row_major() {
        let mut grid = Grid::new();
        grid.activate(0, 1);
        let ascii = grid.to_ascii();
        let first = ascii.lines().next().unwrap();
        assert_eq!(&first[..3], ".#.");
        assert_eq!(ascii.lines().count(), GRID_SIZE);
    }
}
