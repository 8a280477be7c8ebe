//! Data cleaning - keep consummated sales in well-supported geographies.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{ProphecyError, Result};
use crate::types::{
    config::CleanerConfig,
    geography::{GeographyKey, GroupBy},
    record::{RawDataset, SaleRecord, SaleStatus},
};

/// Columns every dataset needs regardless of grouping.
const REQUIRED_COLUMNS: &[&str] = &["status", "price", "zip_code"];

/// Sold records of the retained geographies. Built once, read-only after.
#[derive(Debug, Clone, Serialize)]
pub struct CleanedDataset {
    group_by: GroupBy,
    records: Vec<SaleRecord>,
    geographies: Vec<GeographyKey>,
}

impl CleanedDataset {
    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    /// Retained geographies, in order of first appearance.
    pub fn geographies(&self) -> &[GeographyKey] {
        &self.geographies
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a retained geography by city (and state, when grouped by both).
    pub fn find_geography(&self, city: &str, state: Option<&str>) -> Option<&GeographyKey> {
        self.geographies.iter().find(|key| {
            key.city.eq_ignore_ascii_case(city)
                && match (&key.state, state) {
                    (Some(expected), Some(given)) => expected.eq_ignore_ascii_case(given),
                    (Some(_), None) => false,
                    (None, _) => true,
                }
        })
    }
}

/// Filter raw sales to sold records in geographies with enough support.
///
/// Drops the columns that carry no predictive signal (broker, status,
/// street, previous sale date) and keeps a geography only when its sold
/// record count is strictly greater than `config.min_support`.
#[instrument(skip(raw), fields(rows = raw.len()))]
pub fn clean(raw: &RawDataset, config: &CleanerConfig) -> Result<CleanedDataset> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .chain(config.group_by.columns())
        .copied()
        .filter(|column| !raw.has_column(column))
        .collect();
    if !missing.is_empty() {
        return Err(ProphecyError::DataLoad(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let sold: Vec<(GeographyKey, SaleRecord)> = raw
        .records()
        .iter()
        .filter(|r| r.status() == Some(SaleStatus::Sold))
        .filter_map(|r| {
            let key =
                GeographyKey::for_record(config.group_by, r.city.as_deref(), r.state.as_deref())?;
            let record = SaleRecord::from_raw(r)?;
            Some((key, record))
        })
        .collect();

    let mut counts: HashMap<&GeographyKey, usize> = HashMap::new();
    for (key, _) in &sold {
        *counts.entry(key).or_default() += 1;
    }

    let mut seen: HashSet<&GeographyKey> = HashSet::new();
    let mut geographies = Vec::new();
    let mut records = Vec::new();
    for (key, record) in &sold {
        if counts[key] <= config.min_support {
            continue;
        }
        if seen.insert(key) {
            geographies.push(key.clone());
        }
        records.push(record.clone());
    }

    info!(
        sold = sold.len(),
        kept = records.len(),
        geographies = geographies.len(),
        min_support = config.min_support,
        "Cleaned sales data"
    );

    Ok(CleanedDataset {
        group_by: config.group_by,
        records,
        geographies,
    })
}
