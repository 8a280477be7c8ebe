//! Per-request training and prediction.
//!
//! Every call fits a fresh model against the partition it is given; nothing
//! is cached between requests.

use tracing::{info, instrument};

use crate::error::{ProphecyError, Result};
use crate::forest::RandomForest;
use crate::pipeline::{
    encode::ColumnLayout, metrics::mean_absolute_percentage_error, partition::Partition,
    split::train_test_split,
};
use crate::traits::regressor::{FeatureMatrix, Regressor, TrainRegressor};
use crate::types::{config::TrainerConfig, features::FeatureMap, prediction::PredictionResult};

/// Train the default random forest and predict the request's price.
pub fn train_and_predict(
    partition: &Partition,
    request: &FeatureMap,
    config: &TrainerConfig,
) -> Result<PredictionResult> {
    train_and_predict_with(partition, request, config, &RandomForest::from_config(config))
}

/// Train `learner` on the partition and predict the request's price.
///
/// Rows missing any referenced column are dropped, the rest split with the
/// configured seed; the held-out MAPE becomes the confidence band.
#[instrument(skip_all, fields(geography = ?partition.key(), rows = partition.len()))]
pub fn train_and_predict_with<T: TrainRegressor>(
    partition: &Partition,
    request: &FeatureMap,
    config: &TrainerConfig,
    learner: &T,
) -> Result<PredictionResult> {
    let layout = ColumnLayout::for_request(partition, request)?;

    let mut features = FeatureMatrix::new(layout.len());
    let mut target = Vec::new();
    for record in partition.records() {
        let (Some(price), Some(row)) = (record.price, layout.encode_record(record)) else {
            continue;
        };
        features.push_row(&row);
        target.push(price);
    }

    let split = train_test_split(target.len(), config.test_fraction, config.seed)?;

    let train_x = features.select(&split.train);
    let train_y: Vec<f64> = split.train.iter().map(|&i| target[i]).collect();
    let test_x = features.select(&split.test);
    let test_y: Vec<f64> = split.test.iter().map(|&i| target[i]).collect();

    let model = learner.train(&train_x, &train_y)?;

    let confidence_mape = mean_absolute_percentage_error(&test_y, &model.predict_all(&test_x))
        .ok_or_else(|| ProphecyError::insufficient("held-out rows all have a zero price"))?;

    let predicted_price = model.predict(&layout.encode_request(request));

    info!(
        columns = ?layout.names(),
        train_rows = train_y.len(),
        test_rows = test_y.len(),
        predicted_price,
        confidence_mape,
        "Predicted price"
    );

    Ok(PredictionResult {
        predicted_price,
        confidence_mape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::features::Feature;

    /// Learner that always predicts the training mean.
    struct MeanLearner;

    struct MeanModel(f64);

    impl Regressor for MeanModel {
        fn predict(&self, _row: &[f64]) -> f64 {
            self.0
        }
    }

    impl TrainRegressor for MeanLearner {
        type Model = MeanModel;

        fn train(&self, _features: &FeatureMatrix, target: &[f64]) -> Result<MeanModel> {
            Ok(MeanModel(target.iter().sum::<f64>() / target.len() as f64))
        }
    }

    fn constant_partition(n: usize, price: f64) -> Partition {
        use crate::pipeline::{clean::clean, partition::partition};
        use crate::types::config::{CleanerConfig, PartitionConfig};
        use crate::types::geography::GeographyKey;
        use crate::types::record::{RawDataset, RawSaleRecord};

        // Spread prices so the outlier band keeps the middle rows.
        let rows = (0..n)
            .map(|i| RawSaleRecord {
                status: Some("sold".into()),
                price: Some(price + i as f64),
                bed: Some(3.0),
                city: Some("Austin".into()),
                state: Some("TX".into()),
                ..Default::default()
            })
            .collect();
        let cleaned = clean(&RawDataset::from_records(rows), &CleanerConfig::new().with_min_support(0)).unwrap();
        partition(&cleaned, Some(&GeographyKey::new("Austin", "TX")), &PartitionConfig::default())
    }

    #[test]
    fn test_learner_is_interchangeable() {
        let part = constant_partition(50, 100_000.0);
        let request = FeatureMap::new().with(Feature::Bed, 3.0);

        let result =
            train_and_predict_with(&part, &request, &TrainerConfig::default(), &MeanLearner).unwrap();

        assert!(result.predicted_price > 100_000.0 && result.predicted_price < 100_050.0);
        assert!(result.confidence_mape >= 0.0 && result.confidence_mape < 0.1);
    }

    #[test]
    fn test_empty_partition_is_insufficient() {
        let request = FeatureMap::new().with(Feature::Bed, 3.0);
        let err = train_and_predict(&Partition::empty(), &request, &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, ProphecyError::InsufficientData { .. }));
    }

    #[test]
    fn test_all_rows_missing_feature_is_insufficient() {
        let part = constant_partition(50, 100_000.0);
        let request = FeatureMap::new().with(Feature::HouseSize, 2_000.0);

        let err = train_and_predict(&part, &request, &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, ProphecyError::InsufficientData { .. }));
    }
}
