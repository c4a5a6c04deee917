use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use digit_sketch::{DrawingScreen, PhotoScreen, PredictionClient};

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind { Info, Error }

/// Inline notice for things that are not recognition failures
/// (busy screen, upload problems).
#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn info(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Info, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// Freehand drawing tab.
    pub drawing:      DrawingScreen,
    /// Photo tab.
    pub photo:        PhotoScreen,
    /// Side of the drawing canvas in CSS pixels.
    pub surface_size: f64,
    /// Where uploaded photos are stored so they can be referenced by URI.
    pub upload_dir:   PathBuf,
    /// One-shot flash message for the next page render.
    pub flash:        Option<FlashMessage>,
}

impl StudioState {
    pub fn new(client: Arc<PredictionClient>, surface_size: f64, upload_dir: PathBuf) -> Self {
        StudioState {
            drawing: DrawingScreen::new(client.clone(), surface_size),
            photo:   PhotoScreen::new(client),
            surface_size,
            upload_dir,
            flash:   None,
        }
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state handed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

/// Locks the shared state. A handler that panicked mid-request leaves the
/// screens usable, so poisoning is ignored.
pub fn lock(state: &SharedState) -> MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
