//! End-to-end estimation through the session facade with mock collaborators.

use std::sync::Arc;

use prophecy::testing::{linear_sales, MockExtractor, MockLookup};
use prophecy::{
    clean, CleanedDataset, CleanerConfig, Estimate, Estimator, Feature, FeatureMap, GeographyKey,
    ProphecyError, RawDataset, RawSaleRecord, TrainerConfig, ZipCode,
};

const ZIPS: [u32; 3] = [23220, 23221, 23222];

fn richmond_sales() -> Arc<CleanedDataset> {
    let mut rows = linear_sales("Richmond", "VA", 300, &ZIPS);
    // Too few sales to survive cleaning.
    rows.extend(linear_sales("Ashland", "VA", 20, &[23005]));
    // Listings, not sales.
    rows.extend(linear_sales("Richmond", "VA", 50, &ZIPS).into_iter().map(|r| RawSaleRecord {
        status: Some("for_sale".into()),
        ..r
    }));

    let raw = RawDataset::from_records(rows);
    Arc::new(clean(&raw, &CleanerConfig::new().with_min_support(100)).unwrap())
}

fn estimator(
    extractor: MockExtractor,
    lookup: MockLookup,
) -> Estimator<MockExtractor, MockLookup> {
    let mut estimator = Estimator::new(richmond_sales(), extractor, lookup)
        .with_trainer_config(TrainerConfig::default().with_n_estimators(20));
    estimator.select(Some(GeographyKey::new("Richmond", "VA")));
    estimator
}

fn predicted(estimate: Estimate) -> (prophecy::PredictionResult, FeatureMap) {
    match estimate {
        Estimate::Predicted { result, features } => (result, features),
        other => panic!("expected a prediction, got {:?}", other),
    }
}

#[test]
fn test_clean_keeps_supported_sold_geographies() {
    let cleaned = richmond_sales();

    assert_eq!(cleaned.geographies(), &[GeographyKey::new("Richmond", "VA")]);
    assert_eq!(cleaned.len(), 300);
    assert!(cleaned.find_geography("richmond", Some("va")).is_some());
    assert!(cleaned.find_geography("Ashland", Some("VA")).is_none());
}

#[test]
fn test_partition_trims_price_tails() {
    let estimator = estimator(MockExtractor::new(), MockLookup::new());
    let partition = estimator.partition();

    let (lower, upper) = partition.price_band().unwrap();
    assert!(partition.len() < 300);
    assert!(partition
        .records()
        .iter()
        .all(|r| r.price.is_some_and(|p| p > lower && p < upper)));
    assert_eq!(
        partition.zip_codes(),
        ZIPS.iter().copied().map(ZipCode::new).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_house_size_prediction_tracks_prices() {
    let estimator = estimator(
        MockExtractor::always(r#"{"house_size": "2500"}"#),
        MockLookup::new(),
    );

    let (result, features) = predicted(estimator.estimate("2500 sqft colonial").await.unwrap());

    assert_eq!(features.get(Feature::HouseSize), Some(2_500.0));
    let summary = estimator.partition().price_summary(&[]).unwrap();
    assert!(result.predicted_price >= summary.min && result.predicted_price <= summary.max);
    assert!((result.predicted_price - 250_000.0).abs() < 25_000.0);
    assert!(result.confidence_mape.is_finite() && result.confidence_mape >= 0.0);
    assert!(result.confidence_mape < 5.0);
    assert!(result.lower_bound() <= result.predicted_price);
    assert!(result.predicted_price <= result.upper_bound());
}

#[tokio::test]
async fn test_repeated_estimates_are_identical() {
    let estimator = estimator(
        MockExtractor::always(r#"{"house_size": "2500", "bed": 3}"#),
        MockLookup::new(),
    );

    let first = estimator.estimate("3 bed, 2500 sqft").await.unwrap();
    let second = estimator.estimate("3 bed, 2500 sqft").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_single_quoted_response_with_zip_and_null() {
    let estimator = estimator(
        MockExtractor::always("{'house_size': '2500 sqft', 'zip_code': '23221', 'bed': null}"),
        MockLookup::new(),
    );

    let (result, features) = predicted(estimator.estimate("2500 sqft in 23221").await.unwrap());

    assert_eq!(features.zip_code(), Some(ZipCode::new(23221)));
    assert!(features.contains(Feature::Bed));
    assert_eq!(features.get(Feature::Bed), None);
    assert!(result.predicted_price > 0.0);
}

#[tokio::test]
async fn test_unknown_zip_then_retry_without_it() {
    let estimator = estimator(
        MockExtractor::always(r#"{"house_size": 2500, "zip_code": 90210}"#),
        MockLookup::new(),
    );

    match estimator.estimate("2500 sqft in 90210").await.unwrap_err() {
        ProphecyError::UnknownCategory { zip_code, available } => {
            assert_eq!(zip_code, ZipCode::new(90210));
            assert_eq!(available.len(), ZIPS.len());
        }
        other => panic!("expected UnknownCategory, got {:?}", other),
    }

    let features = estimator.extract("2500 sqft in 90210").await.unwrap();
    let result = estimator.predict(&features.without_zip_code()).unwrap();
    assert!(result.predicted_price > 0.0);
}

#[tokio::test]
async fn test_address_is_resolved_with_selected_geography() {
    let lookup = MockLookup::returning(
        FeatureMap::new()
            .with(Feature::HouseSize, 2_000.0)
            .with(Feature::Bed, 3.0)
            .with_reference_valuation(199_000.0),
    );
    let estimator = estimator(
        MockExtractor::always(r#"{"street": "12 Oak Ave", "zip": "23221"}"#),
        lookup.clone(),
    );

    let (result, features) = predicted(estimator.estimate("12 Oak Ave 23221").await.unwrap());

    let calls = lookup.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].street, "12 Oak Ave");
    assert_eq!(calls[0].city, "Richmond");
    assert_eq!(calls[0].state.as_deref(), Some("VA"));
    assert_eq!(calls[0].zip.as_deref(), Some("23221"));

    assert_eq!(features.zip_code(), Some(ZipCode::new(23221)));
    assert_eq!(features.reference_valuation(), Some(199_000.0));
    assert!(result.predicted_price > 0.0);
}

#[tokio::test]
async fn test_sentinel_is_not_enough_data() {
    let extractor = MockExtractor::always("N/A");
    let estimator = estimator(extractor.clone(), MockLookup::new());

    match estimator.estimate("lovely place").await.unwrap() {
        Estimate::NotEnoughData { vocabulary } => {
            assert!(vocabulary.contains(&"house_size"));
            assert!(vocabulary.contains(&"zip_code"));
        }
        other => panic!("expected NotEnoughData, got {:?}", other),
    }
    assert_eq!(extractor.calls(), vec!["lovely place".to_string()]);
}

#[tokio::test]
async fn test_collaborator_failures_propagate() {
    let estimator = estimator(
        MockExtractor::always(r#"{"street": "12 Oak Ave"}"#),
        MockLookup::new(),
    );
    let err = estimator.estimate("12 Oak Ave").await.unwrap_err();
    assert!(matches!(err, ProphecyError::ExternalService(_)));

    let estimator = estimator_with_prose();
    let err = estimator.estimate("anything").await.unwrap_err();
    assert!(matches!(err, ProphecyError::Parse { .. }));
}

fn estimator_with_prose() -> Estimator<MockExtractor, MockLookup> {
    estimator(
        MockExtractor::always("The house seems nice."),
        MockLookup::new(),
    )
}

#[tokio::test]
async fn test_requires_a_selection() {
    let mut estimator = estimator(
        MockExtractor::always(r#"{"bed": 3}"#),
        MockLookup::new(),
    );

    estimator.select(None);
    assert!(estimator.partition().is_empty());
    let err = estimator.estimate("3 bed").await.unwrap_err();
    assert!(matches!(err, ProphecyError::InsufficientData { .. }));

    let err = estimator.estimate("   ").await.unwrap_err();
    assert!(matches!(err, ProphecyError::InsufficientData { .. }));
}

#[tokio::test]
async fn test_reselecting_keeps_old_snapshot() {
    let mut estimator = estimator(MockExtractor::new(), MockLookup::new());

    let before = estimator.partition();
    estimator.select(Some(GeographyKey::new("Ashland", "VA")));

    assert!(estimator.partition().is_empty());
    assert!(!before.is_empty());
}
