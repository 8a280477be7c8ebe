//! Zillow-backed property lookup.

use async_trait::async_trait;
use tracing::{info, instrument};
use zillow_client::{PropertyDetails, ZillowClient};

use crate::error::{ProphecyError, Result};
use crate::traits::lookup::PropertyLookup;
use crate::types::features::{AddressQuery, Feature, FeatureMap, ZipCode};

const SQUARE_FEET_PER_ACRE: f64 = 43_560.0;

pub struct ZillowLookup {
    client: ZillowClient,
}

impl ZillowLookup {
    pub fn new(client: ZillowClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PropertyLookup for ZillowLookup {
    #[instrument(skip(self), fields(address = %address.full_address()))]
    async fn lookup(&self, address: &AddressQuery) -> Result<FeatureMap> {
        let details = self
            .client
            .property_by_address(&address.full_address())
            .await
            .map_err(ProphecyError::external)?;

        let zip_code = address
            .zip
            .as_deref()
            .and_then(|z| z.trim().parse::<u32>().ok())
            .and_then(|z| (z <= ZipCode::MAX).then(|| ZipCode::new(z)));

        let features = features_from_details(&details, zip_code);
        info!(
            features = features.numeric().count(),
            has_valuation = features.reference_valuation().is_some(),
            "Resolved property record"
        );
        Ok(features)
    }
}

/// Map a property record onto the feature vocabulary.
///
/// Lot size is only reported when the record gives it in square feet; it is
/// converted to acres and rounded to two decimals. The queried zip is echoed
/// back and the record's zestimate becomes the reference valuation.
pub fn features_from_details(details: &PropertyDetails, zip_code: Option<ZipCode>) -> FeatureMap {
    let mut features = FeatureMap::new();

    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());

    if let Some(bed) = finite(details.bedrooms) {
        features.set(Feature::Bed, Some(bed));
    }
    if let Some(bath) = finite(details.bathrooms) {
        features.set(Feature::Bath, Some(bath));
    }
    if let Some(size) = finite(details.living_area) {
        features.set(Feature::HouseSize, Some(size));
    }
    if details.lot_area_units.as_deref() == Some("Square Feet") {
        if let Some(sqft) = finite(details.lot_area_value) {
            let acres = (sqft / SQUARE_FEET_PER_ACRE * 100.0).round() / 100.0;
            features.set(Feature::AcreLot, Some(acres));
        }
    }

    features.set_zip_code(zip_code);
    features.set_reference_valuation(finite(details.zestimate));
    features
}
