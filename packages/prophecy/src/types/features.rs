//! Feature maps extracted from free text or property records.
//!
//! A `FeatureMap` is the explicit schema behind a prediction request: the
//! numeric columns the model can train on, an optional zip code, an optional
//! reference valuation, and an extension map for keys the extractor returned
//! that are not training columns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric training columns, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Bed,
    Bath,
    AcreLot,
    HouseSize,
}

impl Feature {
    pub const ALL: [Feature; 4] = [Self::Bed, Self::Bath, Self::AcreLot, Self::HouseSize];

    /// Column name in the dataset and in extraction output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bed => "bed",
            Self::Bath => "bath",
            Self::AcreLot => "acre_lot",
            Self::HouseSize => "house_size",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Every name the extraction capability may return as a feature.
    pub fn vocabulary() -> Vec<&'static str> {
        let mut names: Vec<_> = Self::ALL.iter().map(|f| f.name()).collect();
        names.push(ZIP_CODE_KEY);
        names
    }

    /// Human label for a vocabulary entry ("acre_lot" -> "Acre lot").
    pub fn label(name: &str) -> String {
        let spaced = name.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extraction key carrying the zip code.
pub const ZIP_CODE_KEY: &str = "zip_code";

/// A five-digit US zip code, stored numerically as in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipCode(u32);

impl ZipCode {
    pub const MAX: u32 = 99_999;

    pub fn new(code: u32) -> Self {
        Self(code.min(Self::MAX))
    }

    /// Accept whole numbers in range; the dataset stores zips as floats.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value.fract() == 0.0 && (0.0..=Self::MAX as f64).contains(&value) {
            Some(Self(value as u32))
        } else {
            None
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured request for one prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureMap {
    /// Known numeric columns; `None` means the key was present but held no number.
    features: BTreeMap<Feature, Option<f64>>,

    /// Requested zip code, one-hot encoded against the partition.
    zip_code: Option<ZipCode>,

    /// Third-party valuation, shown next to the prediction and never trained on.
    reference_valuation: Option<f64>,

    /// Keys that are not training columns.
    extra: BTreeMap<String, Option<f64>>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, Some(value));
        self
    }

    pub fn with_zip_code(mut self, zip_code: ZipCode) -> Self {
        self.zip_code = Some(zip_code);
        self
    }

    pub fn with_reference_valuation(mut self, valuation: f64) -> Self {
        self.reference_valuation = Some(valuation);
        self
    }

    pub fn set(&mut self, feature: Feature, value: Option<f64>) {
        self.features.insert(feature, value);
    }

    pub fn set_zip_code(&mut self, zip_code: Option<ZipCode>) {
        self.zip_code = zip_code;
    }

    pub fn set_reference_valuation(&mut self, valuation: Option<f64>) {
        self.reference_valuation = valuation;
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: Option<f64>) {
        self.extra.insert(key.into(), value);
    }

    /// Value of a feature, `None` if absent or null.
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.features.get(&feature).copied().flatten()
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.features.contains_key(&feature)
    }

    /// Features that carry a number, in encoding order.
    pub fn numeric(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.features
            .iter()
            .filter_map(|(feature, value)| value.map(|v| (*feature, v)))
    }

    /// Features present with a null value.
    pub fn nulls(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(feature, _)| *feature)
    }

    pub fn zip_code(&self) -> Option<ZipCode> {
        self.zip_code
    }

    pub fn reference_valuation(&self) -> Option<f64> {
        self.reference_valuation
    }

    pub fn extra(&self) -> &BTreeMap<String, Option<f64>> {
        &self.extra
    }

    /// The same request with the zip code removed.
    pub fn without_zip_code(&self) -> Self {
        Self {
            zip_code: None,
            ..self.clone()
        }
    }

    /// Nothing was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
            && self.zip_code.is_none()
            && self.reference_valuation.is_none()
            && self.extra.is_empty()
    }
}

/// Address components handed to the property-record lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl AddressQuery {
    /// Single-line address ("street, city, state zip").
    pub fn full_address(&self) -> String {
        let mut address = format!("{}, {}", self.street, self.city);
        if let Some(state) = &self.state {
            address.push_str(", ");
            address.push_str(state);
        }
        if let Some(zip) = &self.zip {
            address.push(' ');
            address.push_str(zip);
        }
        address
    }
}
