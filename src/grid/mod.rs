pub mod grid;
pub mod stroke;

pub use grid::{Grid, GRID_SIZE, CELL_COUNT};
pub use stroke::{PointerEvent, StrokeInput};
