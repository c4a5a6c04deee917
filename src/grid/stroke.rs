use crate::grid::grid::{Grid, GRID_SIZE};

/// Pointer samples delivered by the drawing surface, in its local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Finger or button went down. Never paints on its own.
    Start { x: f64, y: f64 },
    /// Pointer moved while down.
    Move { x: f64, y: f64 },
    /// Pointer lifted.
    End,
}

/// Maps continuous pointer movement onto grid cells.
///
/// The surface is square with side `surface_size`; each cell covers
/// `surface_size / 28` units. Samples that land outside the surface are still
/// forwarded and dropped by the grid's own bounds check.
#[derive(Debug, Clone, Copy)]
pub struct StrokeInput {
    cell_size: f64,
}

impl StrokeInput {
    pub fn new(surface_size: f64) -> StrokeInput {
        StrokeInput { cell_size: surface_size / GRID_SIZE as f64 }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Maps a local coordinate pair to `(row, col)`.
    pub fn cell_at(&self, x: f64, y: f64) -> (i64, i64) {
        let col = (x / self.cell_size).floor();
        let row = (y / self.cell_size).floor();
        (to_index(row), to_index(col))
    }

    /// Applies one pointer event to `grid`.
    ///
    /// Returns `true` when the grid changed and the surface needs a re-render.
    pub fn apply(&self, grid: &mut Grid, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Move { x, y } => {
                let (row, col) = self.cell_at(x, y);
                grid.activate(row, col)
            }
            PointerEvent::Start { .. } | PointerEvent::End => false,
        }
    }

    /// Replays a sequence of move samples. Returns the number of newly filled cells.
    pub fn replay<I>(&self, grid: &mut Grid, samples: I) -> usize
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        samples
            .into_iter()
            .filter(|&(x, y)| self.apply(grid, PointerEvent::Move { x, y }))
            .count()
    }
}

// NaN and infinities land far outside the grid so the bounds check drops them.
fn to_index(v: f64) -> i64 {
    if v.is_finite() { v as i64 } else { i64::MIN }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_map_to_cells_by_floor() {
        let input = StrokeInput::new(280.0);
        assert_eq!(input.cell_size(), 10.0);
        assert_eq!(input.cell_at(0.0, 0.0), (0, 0));
        assert_eq!(input.cell_at(9.99, 19.5), (1, 0));
        assert_eq!(input.cell_at(279.9, 279.9), (27, 27));
        assert_eq!(input.cell_at(-0.5, 5.0), (0, -1));
    }

    #[test]
    fn only_moves_paint() {
        let input = StrokeInput::new(280.0);
        let mut grid = Grid::new();

        assert!(!input.apply(&mut grid, PointerEvent::Start { x: 15.0, y: 15.0 }));
        assert!(!input.apply(&mut grid, PointerEvent::End));
        assert!(grid.is_empty());

        assert!(input.apply(&mut grid, PointerEvent::Move { x: 15.0, y: 25.0 }));
        assert!(grid.is_filled(2, 1));
        // Same cell again: no change, no re-render.
        assert!(!input.apply(&mut grid, PointerEvent::Move { x: 16.0, y: 26.0 }));
    }

    #[test]
    fn samples_outside_surface_are_tolerated() {
        let input = StrokeInput::new(280.0);
        let mut grid = Grid::new();
        let painted = input.replay(&mut grid, vec![
            (-3.0, 10.0),
            (285.0, 10.0),
            (10.0, 300.0),
            (f64::NAN, 4.0),
            (f64::INFINITY, 4.0),
            (4.0, 4.0),
        ]);
        assert_eq!(painted, 1);
        assert!(grid.is_filled(0, 0));
        assert_eq!(grid.filled_count(), 1);
    }
}
