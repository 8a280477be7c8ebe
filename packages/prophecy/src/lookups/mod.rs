//! Property-record lookup implementations.

#[cfg(feature = "zillow")]
mod zillow;

#[cfg(feature = "zillow")]
pub use zillow::{features_from_details, ZillowLookup};
