//! Estimator - the session facade hosts drive.
//!
//! Holds the cleaned dataset (shared, read-only), the current geography
//! selection with its partition, and the two collaborators. Reselecting
//! swaps in a new partition; it never edits the old one, so anything still
//! holding the previous `Arc<Partition>` keeps a consistent snapshot.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::{ProphecyError, Result};
use crate::pipeline::{
    clean::CleanedDataset,
    extract::extract,
    partition::{partition, Partition},
    train::train_and_predict,
};
use crate::traits::{extractor::ExtractionCapability, lookup::PropertyLookup};
use crate::types::{
    config::{PartitionConfig, TrainerConfig},
    features::{Feature, FeatureMap},
    geography::GeographyKey,
    prediction::PredictionResult,
};

/// Outcome of estimating from a description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Estimate {
    /// Nothing usable was extracted; `vocabulary` lists what the description could mention.
    NotEnoughData { vocabulary: Vec<&'static str> },

    /// A prediction, with the features it was made from.
    Predicted {
        result: PredictionResult,
        features: FeatureMap,
    },
}

pub struct Estimator<E, L> {
    cleaned: Arc<CleanedDataset>,
    capability: E,
    lookup: L,
    partition_config: PartitionConfig,
    trainer_config: TrainerConfig,
    selection: Option<GeographyKey>,
    partition: Arc<Partition>,
}

impl<E, L> Estimator<E, L>
where
    E: ExtractionCapability,
    L: PropertyLookup,
{
    pub fn new(cleaned: Arc<CleanedDataset>, capability: E, lookup: L) -> Self {
        Self {
            cleaned,
            capability,
            lookup,
            partition_config: PartitionConfig::default(),
            trainer_config: TrainerConfig::default(),
            selection: None,
            partition: Arc::new(Partition::empty()),
        }
    }

    pub fn with_partition_config(mut self, config: PartitionConfig) -> Self {
        self.partition_config = config;
        self
    }

    pub fn with_trainer_config(mut self, config: TrainerConfig) -> Self {
        self.trainer_config = config;
        self
    }

    pub fn cleaned(&self) -> &CleanedDataset {
        &self.cleaned
    }

    pub fn selection(&self) -> Option<&GeographyKey> {
        self.selection.as_ref()
    }

    /// Current partition snapshot.
    pub fn partition(&self) -> Arc<Partition> {
        Arc::clone(&self.partition)
    }

    /// Change (or clear) the geography and recompute its partition.
    pub fn select(&mut self, key: Option<GeographyKey>) -> Arc<Partition> {
        let next = partition(&self.cleaned, key.as_ref(), &self.partition_config);
        info!(
            geography = ?key,
            rows = next.len(),
            "Selected geography"
        );
        self.selection = key;
        self.partition = Arc::new(next);
        self.partition()
    }

    /// Extract a feature map for the current selection.
    pub async fn extract(&self, description: &str) -> Result<FeatureMap> {
        let geography = self.require_selection()?;
        extract(description, &self.capability, &self.lookup, geography).await
    }

    /// Train on the current partition and predict.
    pub fn predict(&self, features: &FeatureMap) -> Result<PredictionResult> {
        self.require_selection()?;
        train_and_predict(&self.partition, features, &self.trainer_config)
    }

    /// Description in, estimate out.
    ///
    /// An unknown zip code surfaces as `UnknownCategory`; retrying with
    /// `FeatureMap::without_zip_code` is up to the caller.
    pub async fn estimate(&self, description: &str) -> Result<Estimate> {
        if description.trim().is_empty() {
            return Err(ProphecyError::insufficient("description is empty"));
        }

        let features = self.extract(description).await?;
        if features.is_empty() {
            return Ok(Estimate::NotEnoughData {
                vocabulary: Feature::vocabulary(),
            });
        }

        let result = self.predict(&features)?;
        Ok(Estimate::Predicted { result, features })
    }

    fn require_selection(&self) -> Result<&GeographyKey> {
        match &self.selection {
            Some(key) if !self.partition.is_empty() => Ok(key),
            Some(key) => Err(ProphecyError::insufficient(format!(
                "no sales left for {} after filtering",
                key
            ))),
            None => Err(ProphecyError::insufficient("no geography selected")),
        }
    }
}
