//! Testing utilities including mock implementations.
//!
//! These are useful for exercising the pipeline without making real
//! extraction or property-record calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ProphecyError, Result};
use crate::traits::{extractor::ExtractionCapability, lookup::PropertyLookup};
use crate::types::{
    features::{AddressQuery, FeatureMap, ZipCode},
    record::RawSaleRecord,
};

/// A mock extraction capability.
///
/// Returns a predefined response per description, falling back to a default.
#[derive(Default, Clone)]
pub struct MockExtractor {
    responses: Arc<RwLock<HashMap<String, String>>>,
    default_response: Option<String>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every description with `response`.
    pub fn always(response: impl Into<String>) -> Self {
        Self {
            default_response: Some(response.into()),
            ..Default::default()
        }
    }

    /// Answer one description with `response`.
    pub fn with_response(self, description: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(description.into(), response.into());
        self
    }

    /// Descriptions this mock was asked about.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionCapability for MockExtractor {
    async fn extract_structured(&self, description: &str, _vocabulary: &[&str]) -> Result<String> {
        self.calls.write().unwrap().push(description.to_string());

        let responses = self.responses.read().unwrap();
        responses
            .get(description)
            .or(self.default_response.as_ref())
            .cloned()
            .ok_or_else(|| ProphecyError::external(format!("no mock response for: {}", description)))
    }
}

/// A mock property-record lookup.
#[derive(Default, Clone)]
pub struct MockLookup {
    result: Option<FeatureMap>,
    calls: Arc<RwLock<Vec<AddressQuery>>>,
}

impl MockLookup {
    /// A lookup that fails every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// A lookup that returns `result` (with the queried zip echoed back).
    pub fn returning(result: FeatureMap) -> Self {
        Self {
            result: Some(result),
            ..Default::default()
        }
    }

    /// Queries this mock received.
    pub fn calls(&self) -> Vec<AddressQuery> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PropertyLookup for MockLookup {
    async fn lookup(&self, address: &AddressQuery) -> Result<FeatureMap> {
        self.calls.write().unwrap().push(address.clone());

        let mut result = self
            .result
            .clone()
            .ok_or_else(|| ProphecyError::external("mock lookup has no property"))?;
        let zip = address
            .zip
            .as_deref()
            .and_then(|z| z.trim().parse::<u32>().ok())
            .map(ZipCode::new);
        result.set_zip_code(zip);
        Ok(result)
    }
}

/// Sold rows for one geography with price rising linearly in house size.
///
/// Row `i` has `house_size = 1000 + 10i`, `price = 100 * house_size`, three
/// bedrooms, and cycles through `zips`.
pub fn linear_sales(city: &str, state: &str, n: usize, zips: &[u32]) -> Vec<RawSaleRecord> {
    (0..n)
        .map(|i| {
            let house_size = 1_000.0 + 10.0 * i as f64;
            RawSaleRecord {
                status: Some("sold".to_string()),
                price: Some(100.0 * house_size),
                bed: Some(3.0),
                house_size: Some(house_size),
                city: Some(city.to_string()),
                state: Some(state.to_string()),
                zip_code: (!zips.is_empty()).then(|| zips[i % zips.len()] as f64),
                ..Default::default()
            }
        })
        .collect()
}
