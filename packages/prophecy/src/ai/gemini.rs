//! Gemini implementation of the extraction capability.
//!
//! # Example
//!
//! ```rust,ignore
//! use prophecy::ai::GeminiExtractor;
//!
//! let extractor = GeminiExtractor::from_env()?.with_model("gemini-1.5-flash");
//! let estimator = Estimator::new(cleaned, extractor, lookup);
//! ```

use async_trait::async_trait;
use gemini_client::GeminiClient;
use tracing::debug;

use crate::error::{ProphecyError, Result};
use crate::pipeline::prompts::{format_system_prompt, format_user_prompt};
use crate::traits::extractor::ExtractionCapability;

/// Gemini-backed extractor. Generation runs at temperature 0.
#[derive(Clone)]
pub struct GeminiExtractor {
    client: GeminiClient,
}

impl GeminiExtractor {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let client = GeminiClient::from_env().map_err(ProphecyError::external)?;
        Ok(Self::new(client))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.client = self.client.with_model(model);
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl ExtractionCapability for GeminiExtractor {
    async fn extract_structured(&self, description: &str, vocabulary: &[&str]) -> Result<String> {
        let response = self
            .client
            .generate(format_system_prompt(vocabulary), format_user_prompt(description))
            .await
            .map_err(ProphecyError::external)?;

        debug!(model = %self.client.model(), response = %response, "Extraction response");
        Ok(response)
    }
}
