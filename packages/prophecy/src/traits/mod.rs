//! Core trait abstractions for the estimation pipeline.
//!
//! These traits define the seams where hosts plug in the structured-extraction
//! service, the property-record service, and the regression learner.

pub mod extractor;
pub mod lookup;
pub mod regressor;
