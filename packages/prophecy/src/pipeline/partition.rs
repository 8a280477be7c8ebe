//! Partition module - one geography's sales with local price outliers removed.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::pipeline::clean::CleanedDataset;
use crate::types::{
    config::PartitionConfig, features::ZipCode, geography::GeographyKey, record::SaleRecord,
};

/// Sales of one geography, trimmed to its own inner price band.
///
/// Superseded (never mutated) when the selection changes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    key: Option<GeographyKey>,
    records: Vec<SaleRecord>,
    price_band: Option<(f64, f64)>,
}

/// Count, range and median price of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub count: usize,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl Partition {
    /// The partition for a cleared selection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&GeographyKey> {
        self.key.as_ref()
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    /// Exclusive (lower, upper) price cut-offs used for this geography.
    pub fn price_band(&self) -> Option<(f64, f64)> {
        self.price_band
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No prediction is possible from an empty partition.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct zip codes present, ascending.
    pub fn zip_codes(&self) -> Vec<ZipCode> {
        self.records
            .iter()
            .filter_map(|r| r.zip_code)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Price summary, optionally restricted to some zip codes.
    pub fn price_summary(&self, zip_filter: &[ZipCode]) -> Option<PriceSummary> {
        let mut prices: Vec<f64> = self
            .records
            .iter()
            .filter(|r| {
                zip_filter.is_empty() || r.zip_code.is_some_and(|z| zip_filter.contains(&z))
            })
            .filter_map(|r| r.price)
            .collect();
        if prices.is_empty() {
            return None;
        }
        prices.sort_by(f64::total_cmp);

        Some(PriceSummary {
            count: prices.len(),
            min: prices[0],
            median: quantile(&prices, 0.5),
            max: prices[prices.len() - 1],
        })
    }
}

/// Select one geography and drop its price outliers.
///
/// The cut-offs are quantiles of the selected rows only, so each geography
/// is trimmed against its own market. Rows priced at or beyond either
/// cut-off, and rows with no price, are dropped. A cleared selection yields
/// an empty partition.
pub fn partition(
    cleaned: &CleanedDataset,
    key: Option<&GeographyKey>,
    config: &PartitionConfig,
) -> Partition {
    let Some(key) = key else {
        return Partition::empty();
    };

    let selected: Vec<&SaleRecord> = cleaned
        .records()
        .iter()
        .filter(|r| key.matches(&r.city, r.state.as_deref()))
        .filter(|r| r.price.is_some_and(f64::is_finite))
        .collect();

    let mut prices: Vec<f64> = selected.iter().filter_map(|r| r.price).collect();
    if prices.is_empty() {
        debug!(geography = %key, "No priced sales for geography");
        return Partition {
            key: Some(key.clone()),
            ..Partition::default()
        };
    }
    prices.sort_by(f64::total_cmp);

    let lower = quantile(&prices, config.lower_quantile);
    let upper = quantile(&prices, config.upper_quantile);

    let records: Vec<SaleRecord> = selected
        .into_iter()
        .filter(|r| r.price.is_some_and(|p| p > lower && p < upper))
        .cloned()
        .collect();

    debug!(
        geography = %key,
        selected = prices.len(),
        kept = records.len(),
        lower,
        upper,
        "Partitioned geography"
    );

    Partition {
        key: Some(key.clone()),
        records,
        price_band: Some((lower, upper)),
    }
}

/// Quantile of sorted values with linear interpolation between ranks.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
