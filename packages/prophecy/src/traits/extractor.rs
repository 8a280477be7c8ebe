//! Structured-extraction capability.

use async_trait::async_trait;

use crate::error::Result;

/// Turns a free-text property description into a raw structured response.
///
/// Implementations wrap a specific LLM provider. The response is one of:
/// - the sentinel `N/A` when nothing recognizable is present
/// - an address object (`street`, and whichever of `city`, `state`, `zip`
///   the text states explicitly)
/// - a feature object restricted to `vocabulary`, holding only values
///   present in the text
///
/// The pipeline parses and validates the response; implementations return it
/// verbatim.
#[async_trait]
pub trait ExtractionCapability: Send + Sync {
    async fn extract_structured(&self, description: &str, vocabulary: &[&str]) -> Result<String>;
}
