//! Column layout shared by training rows and the request row.
//!
//! The layout is derived once per request from the partition and the
//! requested features, then used to encode both sides, so the request vector
//! always has the same columns in the same order as the training matrix.

use std::fmt;

use tracing::warn;

use crate::error::{ProphecyError, Result};
use crate::pipeline::partition::Partition;
use crate::types::{
    features::{Feature, FeatureMap, ZipCode},
    record::SaleRecord,
};

/// One model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Numeric(Feature),
    ZipIndicator(ZipCode),
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(feature) => write!(f, "{}", feature),
            Self::ZipIndicator(zip) => write!(f, "zip_{}", zip),
        }
    }
}

/// Ordered model columns: requested numeric features, then one indicator per partition zip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

impl ColumnLayout {
    /// Derive the layout for a request against a partition.
    ///
    /// Null features are dropped from the request. A requested zip code
    /// expands to indicators for every zip in the partition and must be one
    /// of them.
    pub fn for_request(partition: &Partition, request: &FeatureMap) -> Result<Self> {
        for feature in request.nulls() {
            warn!(feature = %feature, "Requested feature has no value, leaving it out");
        }
        for key in request.extra().keys() {
            warn!(key = %key, "Not a training column, leaving it out");
        }

        let mut columns: Vec<Column> = request.numeric().map(|(f, _)| Column::Numeric(f)).collect();

        if let Some(zip_code) = request.zip_code() {
            let available = partition.zip_codes();
            if !available.contains(&zip_code) {
                return Err(ProphecyError::UnknownCategory {
                    zip_code,
                    available,
                });
            }
            columns.extend(available.into_iter().map(Column::ZipIndicator));
        }

        if columns.is_empty() {
            return Err(ProphecyError::insufficient(
                "request has no usable features",
            ));
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names, e.g. `["house_size", "zip_23220", "zip_23221"]`.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    /// Encode a training row; `None` when any referenced numeric value is missing.
    ///
    /// A row without a zip code encodes as all-zero indicators.
    pub fn encode_record(&self, record: &SaleRecord) -> Option<Vec<f64>> {
        self.columns
            .iter()
            .map(|column| match column {
                Column::Numeric(feature) => record.feature(*feature),
                Column::ZipIndicator(zip) => Some(indicator(record.zip_code == Some(*zip))),
            })
            .collect()
    }

    /// Encode the request row; indicators not matching the requested zip are 0.
    pub fn encode_request(&self, request: &FeatureMap) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| match column {
                Column::Numeric(feature) => request.get(*feature).unwrap_or(0.0),
                Column::ZipIndicator(zip) => indicator(request.zip_code() == Some(*zip)),
            })
            .collect()
    }
}

fn indicator(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::clean::{clean, CleanedDataset};
    use crate::pipeline::partition::partition;
    use crate::types::config::{CleanerConfig, PartitionConfig};
    use crate::types::geography::GeographyKey;
    use crate::types::record::{RawDataset, RawSaleRecord};

    const A: u32 = 23220;
    const B: u32 = 23221;
    const C: u32 = 23222;

    fn cleaned() -> CleanedDataset {
        let rows = (0..60)
            .map(|i| RawSaleRecord {
                status: Some("sold".into()),
                price: Some(100_000.0 + 1_000.0 * i as f64),
                house_size: if i == 30 { None } else { Some(1_000.0 + i as f64) },
                city: Some("Richmond".into()),
                state: Some("VA".into()),
                zip_code: Some([C, A, B][i % 3] as f64),
                ..Default::default()
            })
            .collect();
        clean(&RawDataset::from_records(rows), &CleanerConfig::new().with_min_support(0)).unwrap()
    }

    fn richmond() -> Partition {
        partition(
            &cleaned(),
            Some(&GeographyKey::new("Richmond", "VA")),
            &PartitionConfig::default(),
        )
    }

    #[test]
    fn test_one_hot_matches_training_order() {
        let part = richmond();
        let request = FeatureMap::new()
            .with(Feature::HouseSize, 1_500.0)
            .with_zip_code(ZipCode::new(B));

        let layout = ColumnLayout::for_request(&part, &request).unwrap();
        assert_eq!(layout.names(), vec!["house_size", "zip_23220", "zip_23221", "zip_23222"]);
        assert_eq!(layout.encode_request(&request), vec![1_500.0, 0.0, 1.0, 0.0]);

        let row = part
            .records()
            .iter()
            .find(|r| r.zip_code == Some(ZipCode::new(C)) && r.house_size.is_some())
            .unwrap();
        let encoded = layout.encode_record(row).unwrap();
        assert_eq!(encoded.len(), layout.len());
        assert_eq!(&encoded[1..], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_zip_lists_available() {
        let part = richmond();
        let request = FeatureMap::new().with_zip_code(ZipCode::new(90210));

        match ColumnLayout::for_request(&part, &request).unwrap_err() {
            ProphecyError::UnknownCategory { zip_code, available } => {
                assert_eq!(zip_code, ZipCode::new(90210));
                assert_eq!(available, vec![ZipCode::new(A), ZipCode::new(B), ZipCode::new(C)]);
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_nulls_and_extras_are_not_columns() {
        let part = richmond();
        let mut request = FeatureMap::new().with(Feature::HouseSize, 2_000.0);
        request.set(Feature::Bed, None);
        request.set_extra("garage", Some(2.0));

        let layout = ColumnLayout::for_request(&part, &request).unwrap();
        assert_eq!(layout.columns(), &[Column::Numeric(Feature::HouseSize)]);
    }

    #[test]
    fn test_no_usable_features_is_insufficient() {
        let part = richmond();
        let mut request = FeatureMap::new();
        request.set(Feature::Bed, None);

        let err = ColumnLayout::for_request(&part, &request).unwrap_err();
        assert!(matches!(err, ProphecyError::InsufficientData { .. }));
    }

    #[test]
    fn test_missing_value_rows_are_rejected() {
        let part = richmond();
        let request = FeatureMap::new().with(Feature::HouseSize, 1_500.0);
        let layout = ColumnLayout::for_request(&part, &request).unwrap();

        let missing = part.records().iter().find(|r| r.house_size.is_none()).unwrap();
        assert_eq!(layout.encode_record(missing), None);
    }
}
