use log::warn;

use crate::client::PredictionResult;
use crate::present::{alert_for, caption_for, Alert, Caption};
use crate::screen::slot::Outcome;

/// What a screen shows about its last recognition.
///
/// A failure raises a one-shot alert but leaves the previous caption in place.
#[derive(Debug, Default)]
pub struct ResultView {
    result: Option<PredictionResult>,
    caption: Option<Caption>,
    alert: Option<Alert>,
}

impl ResultView {
    pub fn new() -> ResultView {
        ResultView::default()
    }

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Ok(result) => {
                self.caption = Some(caption_for(&result));
                self.result = Some(result);
            }
            Err(err) => {
                warn!("recognition failed: {}", err);
                self.alert = Some(alert_for(&err));
            }
        }
    }

    pub fn clear(&mut self) {
        self.result = None;
        self.caption = None;
        self.alert = None;
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    /// Takes the pending alert, clearing it.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }
}
