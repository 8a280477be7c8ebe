//! Interchangeable regression learner.
//!
//! The trainer only needs "fit on a matrix, then predict a row". Any bagged,
//! boosted, or linear learner can sit behind [`TrainRegressor`].

use crate::error::Result;

/// Dense row-major feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Vec<f64>,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Create an empty matrix with a fixed column count.
    pub fn new(n_cols: usize) -> Self {
        Self {
            values: Vec::new(),
            n_cols,
        }
    }

    /// Build from rows; every row must have `n_cols` values.
    pub fn from_rows(n_cols: usize, rows: impl IntoIterator<Item = Vec<f64>>) -> Self {
        let mut matrix = Self::new(n_cols);
        for row in rows {
            matrix.push_row(&row);
        }
        matrix
    }

    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.n_cols, "row width must match column count");
        self.values.extend_from_slice(row);
    }

    pub fn n_rows(&self) -> usize {
        if self.n_cols == 0 {
            0
        } else {
            self.values.len() / self.n_cols
        }
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_cols + col]
    }

    /// Copy out the given rows, in order.
    pub fn select(&self, rows: &[usize]) -> Self {
        let mut matrix = Self::new(self.n_cols);
        for &i in rows {
            matrix.push_row(self.row(i));
        }
        matrix
    }
}

/// A fitted model.
pub trait Regressor {
    fn predict(&self, row: &[f64]) -> f64;

    fn predict_all(&self, matrix: &FeatureMatrix) -> Vec<f64> {
        (0..matrix.n_rows()).map(|i| self.predict(matrix.row(i))).collect()
    }
}

/// A learning algorithm: fit features against a target, get a predictor back.
pub trait TrainRegressor {
    type Model: Regressor;

    fn train(&self, features: &FeatureMatrix, target: &[f64]) -> Result<Self::Model>;
}
