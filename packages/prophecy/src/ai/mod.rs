//! Extraction capability implementations.
//!
//! Reference implementations of [`ExtractionCapability`](crate::traits::extractor::ExtractionCapability).
//! Hosts can use these directly or bring their own.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiExtractor;
