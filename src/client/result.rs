use serde::Deserialize;

use crate::client::error::RequestError;

/// Number of digit classes the service scores.
pub const CLASS_COUNT: usize = 10;

/// A parsed classification: the service's reported digit and one probability
/// per class. The digit is displayed as reported, never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    digit: u8,
    probabilities: [f64; CLASS_COUNT],
}

impl PredictionResult {
    /// Validates and builds a result. Returns `None` unless `digit` is in
    /// `[0, 9]` and there are exactly ten finite probabilities in `[0, 1]`.
    pub fn new(digit: i64, probabilities: &[f64]) -> Option<PredictionResult> {
        let digit = u8::try_from(digit).ok().filter(|d| (*d as usize) < CLASS_COUNT)?;
        let probabilities: [f64; CLASS_COUNT] = probabilities.try_into().ok()?;
        if !probabilities.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p)) {
            return None;
        }
        Some(PredictionResult { digit, probabilities })
    }

    pub fn digit(&self) -> u8 {
        self.digit
    }

    pub fn probabilities(&self) -> &[f64; CLASS_COUNT] {
        &self.probabilities
    }

    /// Probability of the winning class, `max(probabilities)`.
    pub fn confidence(&self) -> f64 {
        self.probabilities.iter().copied().fold(0.0, f64::max)
    }
}

#[derive(Deserialize)]
struct SuccessBody {
    digit: i64,
    probabilities: Vec<f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Strictly parses a 2xx body.
pub(crate) fn parse_success(body: &[u8]) -> Result<PredictionResult, RequestError> {
    let parsed: SuccessBody = serde_json::from_slice(body).map_err(|_| RequestError::Malformed)?;
    PredictionResult::new(parsed.digit, &parsed.probabilities).ok_or(RequestError::Malformed)
}

/// Builds the rejection for a non-2xx response, preferring the body's `error` field.
pub(crate) fn parse_rejection(status: u16, body: &[u8]) -> RequestError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error {}", status));
    RequestError::ServerRejected(message)
}
