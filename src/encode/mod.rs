pub mod pixels;

pub use pixels::{encode, PixelVector, INK, PAPER};
