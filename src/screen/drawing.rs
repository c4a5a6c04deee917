use std::sync::Arc;

use log::debug;

use crate::client::{PredictionClient, PredictionResult};
use crate::encode::encode;
use crate::grid::{Grid, PointerEvent, StrokeInput};
use crate::present::{Alert, Caption};
use crate::screen::error::ActionError;
use crate::screen::slot::RequestSlot;
use crate::screen::view::ResultView;

/// Default side of the drawing surface, in layout units.
pub const DEFAULT_SURFACE_SIZE: f64 = 280.0;

/// State behind the freehand drawing screen.
pub struct DrawingScreen {
    grid: Grid,
    stroke: StrokeInput,
    client: Arc<PredictionClient>,
    slot: RequestSlot,
    view: ResultView,
}

impl DrawingScreen {
    pub fn new(client: Arc<PredictionClient>, surface_size: f64) -> DrawingScreen {
        DrawingScreen {
            grid: Grid::new(),
            stroke: StrokeInput::new(surface_size),
            client,
            slot: RequestSlot::new(),
            view: ResultView::new(),
        }
    }

    /// Feeds one pointer event. Returns `true` when the grid needs a re-render.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        self.stroke.apply(&mut self.grid, event)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.pointer(PointerEvent::Move { x, y })
    }

    /// Clears the drawing and whatever was shown or pending for it.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.slot.invalidate();
        self.view.clear();
    }

    pub fn snapshot(&self) -> &Grid {
        &self.grid
    }

    /// Encodes the grid as it is now and sends it in vector mode.
    pub fn recognize_from_grid(&mut self) -> Result<(), ActionError> {
        let pixels = encode(&self.grid);
        let client = Arc::clone(&self.client);
        let id = self.slot.start(move || client.predict_pixels(&pixels))?;
        debug!("drawing: recognition #{} for {} filled cells", id, self.grid.filled_count());
        Ok(())
    }

    /// Applies a finished response, if one arrived. Returns whether anything changed.
    pub fn poll(&mut self) -> bool {
        match self.slot.poll() {
            Some(outcome) => {
                self.view.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Blocks until the outstanding request (if any) finishes and applies it.
    pub fn wait(&mut self) -> bool {
        match self.slot.wait() {
            Some(outcome) => {
                self.view.apply(outcome);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn caption(&self) -> Option<&Caption> {
        self.view.caption()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.view.result()
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.view.take_alert()
    }
}
