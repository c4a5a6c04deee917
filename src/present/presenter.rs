use std::fmt;

use crate::client::{PredictionResult, RequestError};

/// Alert title shown for every failed recognition.
pub const ALERT_TITLE: &str = "Error";
/// Alert text when the failure carries no server message.
pub const FALLBACK_MESSAGE: &str = "Network error";

/// The two-line summary shown under the drawing or photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub digit_line: String,
    pub confidence_line: String,
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.digit_line, self.confidence_line)
    }
}

/// A modal notification for a failed recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

pub fn caption_for(result: &PredictionResult) -> Caption {
    // Scale first, then round to two places.
    let percent = result.confidence() * 100.0;
    Caption {
        digit_line: format!("Recognized: {}", result.digit()),
        confidence_line: format!("Confidence: {:.2}%", percent),
    }
}

pub fn alert_for(error: &RequestError) -> Alert {
    Alert {
        title: ALERT_TITLE.to_owned(),
        message: error.message().unwrap_or(FALLBACK_MESSAGE).to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(digit: i64, probabilities: &[f64]) -> PredictionResult {
        PredictionResult::new(digit, probabilities).unwrap()
    }

    #[test]
    fn caption_shows_digit_and_scaled_confidence() {
        let caption = caption_for(&result(7, &[0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.91, 0.08, 0.0]));
        assert_eq!(caption.digit_line, "Recognized: 7");
        assert_eq!(caption.confidence_line, "Confidence: 91.00%");
        assert_eq!(caption.to_string(), "Recognized: 7\nConfidence: 91.00%");
    }

    #[test]
    fn confidence_keeps_two_decimals_of_the_percentage() {
        let caption = caption_for(&result(4, &[0.0, 0.0, 0.0, 0.0, 0.98766, 0.01234, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(caption.confidence_line, "Confidence: 98.77%");

        let caption = caption_for(&result(0, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(caption.confidence_line, "Confidence: 100.00%");
    }

    #[test]
    fn alerts_use_server_message_or_fallback() {
        let alert = alert_for(&RequestError::ServerRejected("invalid pixel count".into()));
        assert_eq!(alert.title, ALERT_TITLE);
        assert_eq!(alert.message, "invalid pixel count");

        assert_eq!(alert_for(&RequestError::NoResponse).message, FALLBACK_MESSAGE);
        assert_eq!(alert_for(&RequestError::Malformed).message, FALLBACK_MESSAGE);
    }
}
