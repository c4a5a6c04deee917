pub mod grid;
pub mod encode;
pub mod source;
pub mod client;
pub mod present;
pub mod screen;

// Convenience re-exports
pub use grid::{Grid, PointerEvent, StrokeInput, GRID_SIZE, CELL_COUNT};
pub use encode::{encode, PixelVector};
pub use source::{ImagePicker, ImageReference, ImageSource, PathPicker, PickedImage};
pub use client::{ClientConfig, PredictionClient, PredictionResult, RequestError};
pub use present::{alert_for, caption_for, Alert, Caption};
pub use screen::{ActionError, DrawingScreen, PhotoScreen};
