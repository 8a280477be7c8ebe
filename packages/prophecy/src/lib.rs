//! Property Price Estimation Library
//!
//! Estimates a home's sale price from a free-text description, trained on
//! demand against historical sales in one geography.
//!
//! # Pipeline
//!
//! 1. **Clean** - keep sold rows in geographies with enough support
//! 2. **Partition** - one geography, price outliers trimmed
//! 3. **Extract** - description to features, either directly or via an
//!    address lookup
//! 4. **Train and predict** - bagged regression trees with a held-out MAPE
//!    as the confidence band
//!
//! # Usage
//!
//! ```rust,ignore
//! use prophecy::{clean, CleanerConfig, Estimator, GeographyKey, RawDataset};
//! use prophecy::testing::{MockExtractor, MockLookup};
//!
//! let raw = RawDataset::from_path("realtor-data.csv")?;
//! let cleaned = Arc::new(clean(&raw, &CleanerConfig::default())?);
//!
//! let mut estimator = Estimator::new(
//!     cleaned,
//!     MockExtractor::always(r#"{"house_size": "2000"}"#),
//!     MockLookup::new(),
//! );
//! estimator.select(Some(GeographyKey::new("Richmond", "VA")));
//!
//! let estimate = estimator.estimate("2000 sqft colonial").await?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Records, geography keys, feature maps, configs
//! - [`traits`] - Collaborator seams (extraction, lookup, regressor)
//! - [`pipeline`] - The estimation stages and the [`Estimator`] facade
//! - [`forest`] - Bagged regression trees
//! - [`testing`] - Mock collaborators and fixture data

pub mod error;
pub mod forest;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "gemini")]
pub mod ai;

#[cfg(feature = "zillow")]
pub mod lookups;

// Re-export core types at crate root
pub use error::{ProphecyError, Result};
pub use forest::{Forest, RandomForest};
pub use pipeline::{
    clean, extract, partition, train_and_predict, train_and_predict_with, CleanedDataset,
    ColumnLayout, Estimate, Estimator, Partition, PriceSummary,
};
pub use traits::{
    extractor::ExtractionCapability,
    lookup::PropertyLookup,
    regressor::{FeatureMatrix, Regressor, TrainRegressor},
};
pub use types::{
    config::{CleanerConfig, PartitionConfig, TrainerConfig},
    features::{AddressQuery, Feature, FeatureMap, ZipCode, ZIP_CODE_KEY},
    geography::{GeographyKey, GroupBy},
    prediction::PredictionResult,
    record::{RawDataset, RawSaleRecord, SaleRecord, SaleStatus},
};
