//! External property-record lookup.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::features::{AddressQuery, FeatureMap};

/// Resolves an address to recorded property facts.
///
/// The returned map holds whichever of bed, bath, house size and lot size
/// (in acres) the service knows, the queried zip code echoed back, and the
/// service's own valuation when it has one.
#[async_trait]
pub trait PropertyLookup: Send + Sync {
    async fn lookup(&self, address: &AddressQuery) -> Result<FeatureMap>;
}
