pub mod draw;
pub mod photo;
