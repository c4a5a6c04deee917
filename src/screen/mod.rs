//! Per-screen controllers: the state a drawing or photo screen owns and the
//! action entry points its UI calls.

pub mod drawing;
pub mod error;
pub mod photo;
pub mod slot;
pub mod view;

pub use drawing::DrawingScreen;
pub use error::ActionError;
pub use photo::PhotoScreen;
pub use slot::{Outcome, RequestSlot};
pub use view::ResultView;
