use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZillowError>;

#[derive(Debug, Error)]
pub enum ZillowError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Property not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ZillowError {
    /// Worth another attempt: network failures, throttling, server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::NotFound(_) | Self::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        let api = |status| ZillowError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_transient());
        assert!(api(503).is_transient());
        assert!(!api(404).is_transient());
        assert!(!api(401).is_transient());
        assert!(!ZillowError::Parse("bad".into()).is_transient());
    }
}
