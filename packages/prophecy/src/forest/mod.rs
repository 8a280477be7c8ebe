//! Bagged regression-tree ensemble.
//!
//! Each tree is grown on a bootstrap draw of the training rows; the ensemble
//! predicts the mean of its trees. Trees split on raw values, so feature
//! scaling does not matter and 0/1 indicator columns mix freely with sizes
//! and counts. All randomness comes from one seeded generator, so the same
//! inputs and seed always yield the same model.

pub mod tree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ProphecyError, Result};
use crate::traits::regressor::{FeatureMatrix, Regressor, TrainRegressor};
use crate::types::config::TrainerConfig;

pub use tree::{RegressionTree, TreeParams};

/// Random-forest style learner (bootstrap rows, all features at every split).
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub seed: u64,
    pub bootstrap: bool,
    pub tree: TreeParams,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::from_config(&TrainerConfig::default())
    }
}

impl RandomForest {
    pub fn from_config(config: &TrainerConfig) -> Self {
        Self {
            n_estimators: config.n_estimators.max(1),
            seed: config.seed,
            bootstrap: true,
            tree: TreeParams {
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
            },
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn without_bootstrap(mut self) -> Self {
        self.bootstrap = false;
        self
    }
}

/// Fitted ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<RegressionTree>,
}

impl Forest {
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl Regressor for Forest {
    fn predict(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }
}

impl TrainRegressor for RandomForest {
    type Model = Forest;

    fn train(&self, features: &FeatureMatrix, target: &[f64]) -> Result<Forest> {
        let n = features.n_rows();
        if n == 0 {
            return Err(ProphecyError::insufficient("no training rows"));
        }
        if target.len() != n {
            return Err(ProphecyError::insufficient(format!(
                "{} feature rows but {} target values",
                n,
                target.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let trees = (0..self.n_estimators)
            .map(|_| {
                let samples: Vec<usize> = if self.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(features, target, samples, self.tree)
            })
            .collect();

        tracing::debug!(
            rows = n,
            cols = features.n_cols(),
            trees = self.n_estimators,
            "Fitted random forest"
        );

        Ok(Forest { trees })
    }
}
