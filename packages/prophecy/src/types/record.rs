//! Historical sales rows, raw and cleaned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use crate::error::{ProphecyError, Result};
use crate::types::features::{Feature, ZipCode};

/// Columns of the realtor dataset, in file order.
pub const RAW_COLUMNS: &[&str] = &[
    "brokered_by",
    "status",
    "price",
    "bed",
    "bath",
    "acre_lot",
    "street",
    "city",
    "state",
    "zip_code",
    "house_size",
    "prev_sold_date",
];

/// Listing status of a sale record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleStatus {
    Sold,
    ForSale,
    ReadyToBuild,
    Other(String),
}

impl From<&str> for SaleStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "sold" => Self::Sold,
            "for_sale" => Self::ForSale,
            "ready_to_build" => Self::ReadyToBuild,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One row of the raw dataset, exactly as read.
///
/// Every column is optional; empty cells are missing values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSaleRecord {
    /// Broker id; opaque, never parsed as a number.
    pub brokered_by: Option<String>,
    pub status: Option<String>,
    pub price: Option<f64>,
    pub bed: Option<f64>,
    pub bath: Option<f64>,
    pub acre_lot: Option<f64>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<f64>,
    pub house_size: Option<f64>,
    pub prev_sold_date: Option<String>,
}

impl RawSaleRecord {
    pub fn status(&self) -> Option<SaleStatus> {
        self.status.as_deref().map(SaleStatus::from)
    }
}

/// The raw dataset plus the columns its source actually provided.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    columns: BTreeSet<String>,
    records: Vec<RawSaleRecord>,
}

impl RawDataset {
    /// Wrap in-memory records; all columns are considered present.
    pub fn from_records(records: Vec<RawSaleRecord>) -> Self {
        Self {
            columns: RAW_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        }
    }

    /// Read a headed CSV.
    ///
    /// Missing columns are remembered rather than rejected here; cleaning
    /// decides which ones it needs.
    pub fn from_csv<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<BTreeSet<_>>();

        let mut records = Vec::new();
        for row in reader.deserialize::<RawSaleRecord>() {
            records.push(row?);
        }

        tracing::debug!(rows = records.len(), columns = columns.len(), "Loaded raw sales data");

        Ok(Self { columns, records })
    }

    /// Read a headed CSV file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| ProphecyError::DataLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_csv(io::BufReader::new(file))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn records(&self) -> &[RawSaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A consummated sale with only the predictive columns kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<ZipCode>,
    pub price: Option<f64>,
    pub bed: Option<f64>,
    pub bath: Option<f64>,
    pub acre_lot: Option<f64>,
    pub house_size: Option<f64>,
}

impl SaleRecord {
    /// Create a record with only geography and price set.
    pub fn new(city: impl Into<String>, state: impl Into<String>, price: f64) -> Self {
        Self {
            city: city.into(),
            state: Some(state.into()),
            zip_code: None,
            price: Some(price),
            bed: None,
            bath: None,
            acre_lot: None,
            house_size: None,
        }
    }

    /// Keep the predictive columns of a raw row.
    ///
    /// Returns `None` for rows without a city.
    pub fn from_raw(raw: &RawSaleRecord) -> Option<Self> {
        Some(Self {
            city: raw.city.clone()?,
            state: raw.state.clone(),
            zip_code: raw.zip_code.and_then(ZipCode::from_f64),
            price: raw.price,
            bed: raw.bed,
            bath: raw.bath,
            acre_lot: raw.acre_lot,
            house_size: raw.house_size,
        })
    }

    /// Value of a numeric feature column.
    pub fn feature(&self, feature: Feature) -> Option<f64> {
        let value = match feature {
            Feature::Bed => self.bed,
            Feature::Bath => self.bath,
            Feature::AcreLot => self.acre_lot,
            Feature::HouseSize => self.house_size,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn with_zip_code(mut self, zip_code: ZipCode) -> Self {
        self.zip_code = Some(zip_code);
        self
    }

    pub fn with_feature(mut self, feature: Feature, value: f64) -> Self {
        let slot = match feature {
            Feature::Bed => &mut self.bed,
            Feature::Bath => &mut self.bath,
            Feature::AcreLot => &mut self.acre_lot,
            Feature::HouseSize => &mut self.house_size,
        };
        *slot = Some(value);
        self
    }
}
