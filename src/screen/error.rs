use thiserror::Error as ThisError;

/// A recognition action the screen refused to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ActionError {
    #[error("a recognition request is already in progress")]
    Busy,

    #[error("no image selected")]
    NoImage,
}
