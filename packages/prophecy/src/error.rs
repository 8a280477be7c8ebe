//! Typed errors for the estimation pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so hosts can match on
//! each failure and render the right guidance.

use thiserror::Error;

use crate::types::features::ZipCode;

/// Errors that can occur while cleaning, extracting, or predicting.
#[derive(Debug, Error)]
pub enum ProphecyError {
    /// Raw sales data is malformed or lacks required columns
    #[error("data load error: {0}")]
    DataLoad(String),

    /// Not enough usable rows (or features) to train and evaluate a model
    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    /// The extraction response could not be parsed into a feature map
    #[error("could not parse extraction response ({reason}): {response}")]
    Parse { reason: String, response: String },

    /// The requested zip code was never seen in the partition's training rows
    #[error("zip code {zip_code} is not in the training data for this geography")]
    UnknownCategory {
        zip_code: ZipCode,
        available: Vec<ZipCode>,
    },

    /// Structured-extraction or property-record service failed
    #[error("external service error: {0}")]
    ExternalService(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ProphecyError {
    pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(reason: impl Into<String>, response: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            response: response.into(),
        }
    }

    /// Wrap any collaborator failure.
    pub fn external(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::ExternalService(err.into())
    }
}

impl From<csv::Error> for ProphecyError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => Self::DataLoad(format!("line {}: {}", pos.line(), err)),
            None => Self::DataLoad(err.to_string()),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProphecyError>;
