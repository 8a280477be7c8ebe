//! Held-out error metrics.

/// Mean absolute percentage error, in percent.
///
/// Rows whose actual value is zero are skipped. Returns `None` when no row
/// remains.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let (sum, count) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });

    (count > 0).then(|| 100.0 * sum / count as f64)
}
