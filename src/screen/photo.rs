use std::sync::Arc;

use log::debug;

use crate::client::{PredictionClient, PredictionResult};
use crate::present::{Alert, Caption};
use crate::screen::error::ActionError;
use crate::screen::slot::RequestSlot;
use crate::screen::view::ResultView;
use crate::source::{ImagePicker, ImageReference, ImageSource, SourceError};

/// State behind the "recognize a photo" screen.
pub struct PhotoScreen {
    source: ImageSource,
    client: Arc<PredictionClient>,
    slot: RequestSlot,
    view: ResultView,
}

impl PhotoScreen {
    pub fn new(client: Arc<PredictionClient>) -> PhotoScreen {
        PhotoScreen {
            source: ImageSource::new(),
            client,
            slot: RequestSlot::new(),
            view: ResultView::new(),
        }
    }

    /// Runs the picker. A new image makes any outstanding request stale;
    /// a cancellation changes nothing.
    pub fn pick_image(&mut self, picker: &mut dyn ImagePicker) -> Result<bool, SourceError> {
        let replaced = self.source.pick(picker)?;
        if replaced && self.slot.invalidate() {
            debug!("photo: new image picked; pending request dropped");
        }
        Ok(replaced)
    }

    /// Drops the selected image along with its caption and any pending request.
    pub fn remove_image(&mut self) {
        self.source.clear();
        self.slot.invalidate();
        self.view.clear();
    }

    pub fn current_image(&self) -> Option<&ImageReference> {
        self.source.current()
    }

    /// Uploads the selected image in file mode.
    pub fn recognize_from_image(&mut self) -> Result<(), ActionError> {
        let image = self.source.current().cloned().ok_or(ActionError::NoImage)?;
        let client = Arc::clone(&self.client);
        let filename = image.filename.clone();
        let id = self.slot.start(move || client.predict_file(&image))?;
        debug!("photo: recognition #{} for '{}'", id, filename);
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
