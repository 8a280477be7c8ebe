//! Prediction output.

use serde::Serialize;

/// Point estimate with an error-based confidence band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_price: f64,

    /// Held-out mean absolute percentage error, in percent.
    pub confidence_mape: f64,
}

impl PredictionResult {
    pub fn lower_bound(&self) -> f64 {
        self.predicted_price * (1.0 - self.confidence_mape / 100.0)
    }

    pub fn upper_bound(&self) -> f64 {
        self.predicted_price * (1.0 + self.confidence_mape / 100.0)
    }
}
