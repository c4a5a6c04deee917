use serde::Serialize;

use crate::grid::{Grid, CELL_COUNT};

/// Grayscale value emitted for a filled cell.
pub const INK: u8 = 0;
/// Grayscale value emitted for an unfilled cell.
pub const PAPER: u8 = 255;

/// Row-major grayscale encoding of a `Grid`, as consumed by the inference
/// service. Always exactly `CELL_COUNT` values, each `INK` or `PAPER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PixelVector(Vec<u8>);

impl PixelVector {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Flattens `grid` row by row, mapping ink to 0 and paper to 255.
///
/// The service was trained on this exact ordering and polarity; a mismatch
/// produces wrong predictions without any error.
pub fn encode(grid: &Grid) -> PixelVector {
    let pixels: Vec<u8> = grid
        .snapshot()
        .iter()
        .map(|&filled| if filled { INK } else { PAPER })
        .collect();
    debug_assert_eq!(pixels.len(), CELL_COUNT);
    PixelVector(pixels)
}
